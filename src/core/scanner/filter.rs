//! Extension allow-lists for the two pipelines.

use std::collections::HashSet;
use std::path::Path;

/// Extensions gathered by the collect pipeline
const COLLECT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

/// Extensions normalized by the crop pipeline
const CROP_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// Decides whether a file is an image a pipeline should pick up.
///
/// Matching is on the final extension only and ignores case.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Filter used when collecting images into a flat directory
    pub fn collect() -> Self {
        Self::with_extensions(COLLECT_EXTENSIONS.iter().copied())
    }

    /// Filter used when cropping faces
    pub fn crop() -> Self {
        Self::with_extensions(CROP_EXTENSIONS.iter().copied())
    }

    /// Build a filter from a custom list of extensions (without the dot)
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::collect()
    }
}
