//! Run configuration for the dilation pipeline.

use super::errors::DilationError;

/// Parameters of a dilation run.
///
/// The defaults reproduce the reference pipeline; every value can be
/// overridden from the command line.
#[derive(Debug, Clone)]
pub struct DilationConfig {
    /// Scale factor applied to fibroblast polygons (default: 2.0).
    pub fibroblast_scale_factor: f64,
    /// Scale factor applied to every other cell polygon (default: 1.2).
    pub other_scale_factor: f64,
    /// Douglas-Peucker tolerance for the final boundary, in input
    /// coordinate units (default: 1.0).
    pub simplify_tolerance: f64,
    /// Number of nearest-centroid neighbor candidates examined per
    /// fibroblast (default: 5).
    pub neighbor_candidates: usize,
    /// How many candidates the coarse centroid query fetches before the
    /// self-exclusion filter is applied (default: 10).
    pub boundary_padding_k: usize,
}

impl Default for DilationConfig {
    fn default() -> Self {
        Self {
            fibroblast_scale_factor: 2.0,
            other_scale_factor: 1.2,
            simplify_tolerance: 1.0,
            neighbor_candidates: 5,
            boundary_padding_k: 10,
        }
    }
}

impl DilationConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), DilationError> {
        if !(self.fibroblast_scale_factor.is_finite() && self.fibroblast_scale_factor > 0.0) {
            return Err(DilationError::invalid_config(
                "fibroblast_scale_factor",
                "a finite positive number",
                self.fibroblast_scale_factor.to_string(),
            ));
        }
        if !(self.other_scale_factor.is_finite() && self.other_scale_factor > 0.0) {
            return Err(DilationError::invalid_config(
                "other_scale_factor",
                "a finite positive number",
                self.other_scale_factor.to_string(),
            ));
        }
        if !(self.simplify_tolerance.is_finite() && self.simplify_tolerance >= 0.0) {
            return Err(DilationError::invalid_config(
                "simplify_tolerance",
                "a finite non-negative number",
                self.simplify_tolerance.to_string(),
            ));
        }
        if self.neighbor_candidates == 0 {
            return Err(DilationError::invalid_config(
                "neighbor_candidates",
                "at least 1",
                "0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DilationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let config = DilationConfig {
            fibroblast_scale_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DilationError::Config { .. })
        ));
    }

    #[test]
    fn test_rejects_nan_tolerance() {
        let config = DilationConfig {
            simplify_tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_candidates() {
        let config = DilationConfig {
            neighbor_candidates: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
