//! # Scanner Module
//!
//! Discovers image files for both pipelines.
//!
//! - [`PathScanner`] flattens a mix of files and directories into one list
//!   (collect pipeline).
//! - [`TreeWalker`] walks input trees and pairs every image with its
//!   mirrored destination (crop pipeline).
//!
//! Walk order follows directory-entry order and carries no meaning.
//!
//! ## Example
//! ```rust,ignore
//! use dataset_prep::core::scanner::PathScanner;
//!
//! let result = PathScanner::default().scan(&["/photos".into(), "/more/a.jpg".into()]);
//! println!("{} images, {} problems", result.images.len(), result.errors.len());
//! ```

mod filter;
mod tree;
mod walker;

pub use filter::ImageFilter;
pub use tree::{mirror, ImagePair, TreeScan, TreeWalker};
pub use walker::PathScanner;

use crate::error::ScanError;
use std::path::PathBuf;

/// Result of a flat scan
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered image files
    pub images: Vec<PathBuf>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
