//! Geometric primitives and algorithms for cell outline processing.
//!
//! This module provides the polygon model used by the dilation pipeline:
//! points, boundary rings with their derived queries (centroid, area,
//! containment, scaling), and topology-preserving simplification.

pub mod point;
pub mod ring;
pub mod simplify;

pub use point::Point;
pub use ring::Ring;
pub use simplify::{largest_by_area, simplify, Simplified};
