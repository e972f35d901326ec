//! Shared utilities for the dilation pipeline.
//!
//! Currently this is just the logging setup; the rest of the crate keeps
//! its helpers next to the code that uses them.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set and defaults to `info`
/// otherwise. Calling this twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
