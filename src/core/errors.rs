//! Error types for the dilation pipeline.
//!
//! Fatal conditions (unreadable inputs, unwritable output) surface as
//! [`DilationError`] and abort the run. Per-feature conditions are not
//! errors: they are [`SkipReason`] values that the batch driver counts and
//! moves past, so a single malformed feature never aborts the batch.

use std::path::Path;

use thiserror::Error;

/// Errors that abort a dilation run.
#[derive(Debug, Error)]
pub enum DilationError {
    /// A file could not be read or written.
    #[error("io failure on '{path}'")]
    Io {
        /// Path of the file involved.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file was readable but not parsable as a feature collection.
    #[error("failed to parse feature collection '{path}'")]
    Parse {
        /// Path of the offending file.
        path: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A parsed document did not have the expected collection shape.
    #[error("invalid feature collection '{path}': {message}")]
    InvalidCollection {
        /// Path of the offending file.
        path: String,
        /// Description of the shape violation.
        message: String,
    },

    /// The run configuration is invalid.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },
}

impl DilationError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Wraps a JSON error with the path it occurred on.
    pub fn parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Creates an invalid-collection error.
    pub fn invalid_collection(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::InvalidCollection {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Creates a configuration error for an invalid field value.
    pub fn invalid_config(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: format!(
                "invalid value for '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }
}

/// Why a feature was skipped during extraction.
///
/// Skips are recoverable per-feature conditions: the feature produces no
/// output row and the batch continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The feature had no geometry, or its coordinates were missing, empty,
    /// or not an array of rings.
    EmptyGeometry,
    /// The first ring parsed but had fewer than 3 vertices.
    InvalidRingSize,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyGeometry => write!(f, "empty geometry"),
            SkipReason::InvalidRingSize => write!(f, "ring with fewer than 3 vertices"),
        }
    }
}
