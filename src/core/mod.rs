//! # Core Module
//!
//! The two batch pipelines and the pieces they are built from.
//!
//! ## Modules
//! - `scanner` - Discovers images (flat list or mirrored pairs)
//! - `naming` - Collision-free file names in a target directory
//! - `collect` - Dedup-copy many sources into one directory
//! - `face` - Face detection backends
//! - `normalize` - Crop, resize and pad one image
//! - `crop` - Normalize whole trees into a mirrored output
//! - `pool` - Bounded worker pools

pub mod collect;
pub mod crop;
pub mod face;
pub mod naming;
pub mod normalize;
pub mod pool;
pub mod scanner;

// Re-export commonly used types
pub use collect::{CollectPipeline, CollectResult, CopyOutcome};
pub use crop::{CropPipeline, CropResult, NormalizeOutcome};
pub use face::{FaceDetector, FaceRect, NoFaceDetector};
pub use naming::NameAllocator;
pub use normalize::{FaceCropNormalizer, NormalizeConfig};
pub use scanner::{ImagePair, ImageFilter};
