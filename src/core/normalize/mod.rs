//! # Normalize Module
//!
//! Turns one photo into one fixed-size training sample.
//!
//! ## Steps
//! 1. **Decode** - RGB8 pixels ([`decode_rgb`])
//! 2. **Detect** - first face from the shared [`FaceDetector`]
//! 3. **Crop** - face plus a margin ([`expand_face`]), or the full frame
//!    when no face is found
//! 4. **Resize** - largest aspect-preserving fit ([`fit_within`])
//! 5. **Pad** - center on the canvas ([`pad_to_canvas`])
//! 6. **Encode** - format chosen by the destination extension
//!
//! ## Example
//! ```rust,ignore
//! use dataset_prep::core::face::NoFaceDetector;
//! use dataset_prep::core::normalize::{FaceCropNormalizer, NormalizeConfig};
//! use std::sync::Arc;
//!
//! let normalizer = FaceCropNormalizer::new(Arc::new(NoFaceDetector), NormalizeConfig::default());
//! normalizer.normalize("src/A/x.jpg".as_ref(), "des/A/x.jpg".as_ref())?;
//! ```

mod decode;
mod geometry;
mod resize;

pub use decode::decode_rgb;
pub use geometry::{expand_face, fit_within, padding_for, CropRegion, Padding};
pub use resize::{pad_to_canvas, FastResizer};

use crate::core::face::{FaceDetector, FaceRect};
use crate::error::{NormalizeError, PrepError};
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Default canvas edge in pixels
pub const DEFAULT_CANVAS_SIZE: u32 = 224;

/// Default face margin as a fraction of the face size
pub const DEFAULT_FACE_PADDING: f64 = 0.4;

/// Output geometry for the crop pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Margin added on each side of a face, relative to its width/height
    pub face_padding: f64,
    /// RGB fill for the letterbox bands
    pub pad_color: [u8; 3],
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
            face_padding: DEFAULT_FACE_PADDING,
            pad_color: [0, 0, 0],
        }
    }
}

impl NormalizeConfig {
    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn face_padding(mut self, factor: f64) -> Self {
        self.face_padding = factor;
        self
    }

    pub fn pad_color(mut self, color: [u8; 3]) -> Self {
        self.pad_color = color;
        self
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(PrepError::Config(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !self.face_padding.is_finite() || self.face_padding < 0.0 {
            return Err(PrepError::Config(format!(
                "face padding must be a non-negative number, got {}",
                self.face_padding
            )));
        }
        Ok(())
    }
}

/// What one normalization did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    /// Face the crop was centered on, `None` for a full-frame fallback
    pub face: Option<FaceRect>,
    /// Region cut from the decoded image
    pub crop: CropRegion,
    /// Size of the crop after resizing, before padding
    pub resized: (u32, u32),
}

impl Normalized {
    pub fn face_found(&self) -> bool {
        self.face.is_some()
    }
}

/// Detect, crop, resize and pad a single image.
///
/// Holds no per-image state, so one instance serves every worker.
pub struct FaceCropNormalizer {
    detector: Arc<dyn FaceDetector>,
    config: NormalizeConfig,
}

impl FaceCropNormalizer {
    pub fn new(detector: Arc<dyn FaceDetector>, config: NormalizeConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Read `source`, normalize it and write the result to `destination`.
    ///
    /// Parent directories of `destination` are created as needed. The
    /// source file is never modified.
    pub fn normalize(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<Normalized, NormalizeError> {
        let image = decode_rgb(source)?;
        let (canvas, normalized) = self.normalize_image(&image, source)?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| NormalizeError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        canvas.save(destination).map_err(|e| NormalizeError::Encode {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(normalized)
    }

    /// In-memory part of [`normalize`](Self::normalize). `source` is only
    /// used for error context and logs.
    pub fn normalize_image(
        &self,
        image: &RgbImage,
        source: &Path,
    ) -> Result<(RgbImage, Normalized), NormalizeError> {
        let (width, height) = image.dimensions();

        let faces = self
            .detector
            .detect(image)
            .map_err(|e| NormalizeError::Detect {
                path: source.to_path_buf(),
                source: e,
            })?;

        let face = faces.first().copied();
        let crop = match &face {
            Some(rect) => {
                if faces.len() > 1 {
                    debug!(
                        "{} faces in {}, using the first",
                        faces.len(),
                        source.display()
                    );
                }
                expand_face(rect, self.config.face_padding, width, height)
            }
            None => {
                info!("No face found in {}, using full frame", source.display());
                CropRegion::full(width, height)
            }
        };

        // Degenerate face rectangle, or a zero-sized image
        if crop.is_empty() {
            return Err(NormalizeError::EmptyCrop {
                path: source.to_path_buf(),
            });
        }

        let cropped = imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image();

        let resized_size = fit_within(
            crop.width,
            crop.height,
            self.config.canvas_width,
            self.config.canvas_height,
        );
        let resized = FastResizer::new()
            .resize_rgb(&cropped, resized_size.0, resized_size.1)
            .map_err(|reason| NormalizeError::Resize {
                path: source.to_path_buf(),
                reason,
            })?;

        let canvas = pad_to_canvas(
            &resized,
            self.config.canvas_width,
            self.config.canvas_height,
            self.config.pad_color,
        );

        Ok((
            canvas,
            Normalized {
                face,
                crop,
                resized: resized_size,
            },
        ))
    }
}
