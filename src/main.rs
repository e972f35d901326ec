//! Command-line entry point for fibroblast dilation.
//!
//! # Usage
//!
//! ```bash
//! fibro-dilate slide_042
//! fibro-dilate slide_042 --cells-dir /data/cells --fibroblast-scale 2.5
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use fibro_dilate::core::DilationConfig;
use fibro_dilate::pipeline::run_slide;
use fibro_dilate::utils::init_tracing;

#[derive(Parser)]
#[command(name = "fibro-dilate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dilate fibroblast outlines and resolve neighbor overlaps", long_about = None)]
struct Cli {
    /// Slide identifier; inputs are `<slide>_fibroblasts.geojson` and
    /// `<slide>.geojson` in the cells directory
    slide: String,

    /// Directory holding the per-slide geojson files
    #[arg(long = "cells-dir", default_value = "cells")]
    cells_dir: PathBuf,

    /// Scale factor for fibroblast polygons
    #[arg(long = "fibroblast-scale", default_value_t = 2.0)]
    fibroblast_scale: f64,

    /// Scale factor for all other cell polygons
    #[arg(long = "other-scale", default_value_t = 1.2)]
    other_scale: f64,

    /// Douglas-Peucker tolerance for the output boundary
    #[arg(long = "simplify-tolerance", default_value_t = 1.0)]
    simplify_tolerance: f64,

    /// Number of nearest-neighbor candidates examined per fibroblast
    #[arg(long = "neighbor-candidates", default_value_t = 5)]
    neighbor_candidates: usize,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = DilationConfig {
        fibroblast_scale_factor: cli.fibroblast_scale,
        other_scale_factor: cli.other_scale,
        simplify_tolerance: cli.simplify_tolerance,
        neighbor_candidates: cli.neighbor_candidates,
        ..Default::default()
    };

    match run_slide(&cli.slide, &cli.cells_dir, &config) {
        Ok(stats) => {
            info!(
                resolved = stats.resolved,
                skipped = stats.skipped_empty_geometry + stats.skipped_invalid_ring,
                subtracted = stats.neighbors_subtracted,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("dilation failed: {err}");
            ExitCode::FAILURE
        }
    }
}
