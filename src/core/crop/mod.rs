//! # Crop Module
//!
//! Builds a face dataset: every image under the inputs becomes one
//! fixed-size crop at the same relative path under the output root.
//!
//! ## Stages
//! 1. **Pair** - [`TreeWalker`] maps each image to its mirrored destination
//! 2. **Normalize** - [`ProcessingWorkerPool`] runs a
//!    [`FaceCropNormalizer`] per pair on a bounded pool
//!
//! [`TreeWalker`]: crate::core::scanner::TreeWalker
//! [`FaceCropNormalizer`]: crate::core::normalize::FaceCropNormalizer

mod executor;
mod pipeline;

pub use executor::{NormalizeOutcome, ProcessingWorkerPool};
pub use pipeline::{CropConfig, CropPipeline, CropPipelineBuilder, CropResult};
