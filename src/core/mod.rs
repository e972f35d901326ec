//! Core types of the dilation pipeline.
//!
//! This module holds the run configuration and the error taxonomy shared
//! by every pipeline component.

pub mod config;
pub mod errors;

pub use config::DilationConfig;
pub use errors::{DilationError, SkipReason};
