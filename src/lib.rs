//! # dataset-prep
//!
//! Batch tools for assembling image training sets.
//!
//! ## Pipelines
//! - **collect** - gather images from many files and folders into one flat
//!   directory, renaming on name clashes so nothing is overwritten
//! - **crop** - walk a tree, crop each image to its face (or keep the full
//!   frame), letterbox it onto a fixed canvas and write it to the same
//!   relative path under an output root
//!
//! ## Architecture
//! - `core` - scanning, naming, face detection, normalization, worker pools
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PrepError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"`)
/// applies. Logs go to stderr so stdout stays clean for JSON output.
/// Calling this twice keeps the first subscriber.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
