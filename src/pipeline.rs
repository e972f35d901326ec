//! Slide-level pipeline: derive file paths, load the two collections, run
//! the resolver and write the dilated output next to the inputs.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::collection::FeatureCollection;
use crate::core::{DilationConfig, DilationError};
use crate::resolver::{dilate_collection, DilationStats};

/// Input and output file locations for one slide.
///
/// All three live in the same cells directory and follow the upstream
/// naming convention: `<slide>_fibroblasts.geojson` for the fibroblast
/// subset, `<slide>.geojson` for the full cell set, and
/// `<slide>_fibroblasts_dilated.geojson` for the output.
#[derive(Debug, Clone)]
pub struct SlidePaths {
    /// The fibroblast-only collection.
    pub fibroblasts: PathBuf,
    /// The all-cells collection.
    pub all_cells: PathBuf,
    /// Where the dilated collection is written.
    pub output: PathBuf,
}

impl SlidePaths {
    /// Derives the file locations for `slide` under `cells_dir`.
    pub fn for_slide(cells_dir: &Path, slide: &str) -> Self {
        Self {
            fibroblasts: cells_dir.join(format!("{slide}_fibroblasts.geojson")),
            all_cells: cells_dir.join(format!("{slide}.geojson")),
            output: cells_dir.join(format!("{slide}_fibroblasts_dilated.geojson")),
        }
    }
}

/// Processes one slide end to end.
///
/// Loads the fibroblast and all-cells collections, resolves overlaps and
/// writes the dilated collection. Returns the run counters.
pub fn run_slide(
    slide: &str,
    cells_dir: &Path,
    config: &DilationConfig,
) -> Result<DilationStats, DilationError> {
    let paths = SlidePaths::for_slide(cells_dir, slide);
    info!(
        slide,
        fibroblasts = %paths.fibroblasts.display(),
        cells = %paths.all_cells.display(),
        "starting dilation run"
    );

    let fibroblasts = FeatureCollection::load(&paths.fibroblasts)?;
    let all_cells = FeatureCollection::load(&paths.all_cells)?;
    info!(
        fibroblasts = fibroblasts.len(),
        cells = all_cells.len(),
        "loaded feature collections"
    );

    let (resolved, stats) = dilate_collection(&fibroblasts, &all_cells, config)?;
    resolved.save(&paths.output)?;
    info!(
        output = %paths.output.display(),
        features = resolved.len(),
        "wrote dilated fibroblast outlines"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_naming_convention() {
        let paths = SlidePaths::for_slide(Path::new("cells"), "slide_042");
        assert_eq!(
            paths.fibroblasts,
            Path::new("cells/slide_042_fibroblasts.geojson")
        );
        assert_eq!(paths.all_cells, Path::new("cells/slide_042.geojson"));
        assert_eq!(
            paths.output,
            Path::new("cells/slide_042_fibroblasts_dilated.geojson")
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_slide("absent", dir.path(), &DilationConfig::default());
        assert!(matches!(result, Err(DilationError::Io { .. })));
    }
}
