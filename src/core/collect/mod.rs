//! # Collect Module
//!
//! Gathers images from many files and directories into one flat target
//! directory, renaming on collision instead of overwriting.
//!
//! ## Stages
//! 1. **Prepare** - create the target and seed a [`NameAllocator`] from it
//! 2. **Scan** - [`PathScanner`] flattens the sources into image paths
//! 3. **Copy** - [`CopyWorkerPool`] copies on a bounded pool
//!
//! [`NameAllocator`]: crate::core::naming::NameAllocator
//! [`PathScanner`]: crate::core::scanner::PathScanner

mod executor;
mod manifest;
mod pipeline;

pub use executor::{copy_file, CopyOutcome, CopyWorkerPool};
pub use manifest::{load_manifest, run_jobs, CollectJob};
pub use pipeline::{CollectConfig, CollectPipeline, CollectPipelineBuilder, CollectResult};
