//! Crop, fit and padding arithmetic. Pure functions, no pixels involved.

use crate::core::face::FaceRect;
use serde::{Deserialize, Serialize};

/// Rectangle to cut out of the decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// The whole image
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Border sizes that center an inner image on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Grow a face rectangle by `factor` of its size on every side, clamped to the image.
///
/// The margin is truncated to whole pixels: `pad_w = trunc(factor * width)`,
/// `pad_h = trunc(factor * height)`. Each edge is clamped on its own, so a
/// face near a border keeps its full margin on the other sides.
pub fn expand_face(rect: &FaceRect, factor: f64, image_width: u32, image_height: u32) -> CropRegion {
    let max_x = i64::from(image_width);
    let max_y = i64::from(image_height);
    let pad_w = (factor * rect.width() as f64) as i64;
    let pad_h = (factor * rect.height() as f64) as i64;

    let left = (rect.left - pad_w).clamp(0, max_x);
    let top = (rect.top - pad_h).clamp(0, max_y);
    let right = (rect.right + pad_w).clamp(0, max_x);
    let bottom = (rect.bottom + pad_h).clamp(0, max_y);

    CropRegion {
        x: left as u32,
        y: top as u32,
        width: (right - left).max(0) as u32,
        height: (bottom - top).max(0) as u32,
    }
}

/// Largest size with the same aspect ratio that fits in `target`.
///
/// `scale = min(tw / w, th / h)`, each side rounded and kept within `1..=target`.
pub fn fit_within(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    let scale = f64::min(
        f64::from(target_width) / f64::from(width.max(1)),
        f64::from(target_height) / f64::from(height.max(1)),
    );
    let new_width = (f64::from(width) * scale).round() as u32;
    let new_height = (f64::from(height) * scale).round() as u32;
    (
        new_width.clamp(1, target_width.max(1)),
        new_height.clamp(1, target_height.max(1)),
    )
}

/// Split the leftover canvas space, smaller half on top/left
pub fn padding_for(inner: (u32, u32), canvas: (u32, u32)) -> Padding {
    let delta_w = canvas.0.saturating_sub(inner.0);
    let delta_h = canvas.1.saturating_sub(inner.1);
    let top = delta_h / 2;
    let left = delta_w / 2;
    Padding {
        top,
        bottom: delta_h - top,
        left,
        right: delta_w - left,
    }
}
