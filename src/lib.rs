//! Fibroblast polygon dilation and overlap resolution.
//!
//! The crate takes two GeoJSON-shaped collections produced by a whole-slide
//! cell segmentation — the fibroblast subset and the full cell set — scales
//! every fibroblast boundary outward, and resolves the overlaps the scaling
//! creates: when a dilated fibroblast fully encloses a scaled neighbor
//! cell, the dilated boundary is rebuilt from the vertices that remain
//! closer to the fibroblast's own original outline than to the neighbor's.
//! Results are simplified and written back with all upstream metadata
//! intact.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use fibro_dilate::core::DilationConfig;
//! use fibro_dilate::pipeline::run_slide;
//!
//! # fn main() -> Result<(), fibro_dilate::core::DilationError> {
//! let stats = run_slide("slide_042", Path::new("cells"), &DilationConfig::default())?;
//! println!("resolved {} fibroblasts", stats.resolved);
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod core;
pub mod geometry;
pub mod pipeline;
pub mod resolver;
pub mod spatial;
pub mod utils;

pub use crate::collection::{Feature, FeatureCollection};
pub use crate::core::{DilationConfig, DilationError, SkipReason};
pub use crate::geometry::{Point, Ring};
pub use crate::resolver::{dilate_collection, DilationStats};
