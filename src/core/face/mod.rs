//! # Face Module
//!
//! The face detection seam. The crop pipeline only needs "rectangles in
//! image coordinates"; how they are found is up to the backend.
//!
//! ## Backends
//! - [`NoFaceDetector`] - never finds a face; every image is normalized from
//!   its full frame
//! - `RustfaceDetector` - SeetaFace frontal detector, behind the `rustface`
//!   cargo feature

#[cfg(feature = "rustface")]
mod rustface_backend;

#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;

use crate::error::DetectorError;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Smallest face edge, in pixels, a model-backed detector looks for
pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;

/// Bounding box of a detected face, edges in pixel coordinates.
///
/// Edges may lie outside the image; consumers clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRect {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
}

impl FaceRect {
    pub fn new(top: i64, right: i64, bottom: i64, left: i64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Build from a top-left corner and a size
    pub fn from_xywh(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self::new(y, x + width, y + height, x)
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }
}

/// Pluggable face detection backend.
///
/// One instance is shared by every worker, so implementations must be
/// thread-safe. Rectangles are returned in the backend's order; the crop
/// pipeline uses the first.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceRect>, DetectorError>;
}

/// Detector that never finds a face
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<FaceRect>, DetectorError> {
        Ok(Vec::new())
    }
}
