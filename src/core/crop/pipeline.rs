//! Crop pipeline: pair images with mirrored destinations, then normalize.

use super::executor::{NormalizeOutcome, ProcessingWorkerPool};
use crate::core::face::{FaceDetector, NoFaceDetector};
use crate::core::normalize::{FaceCropNormalizer, NormalizeConfig};
use crate::core::pool::default_crop_workers;
use crate::core::scanner::{ImageFilter, TreeWalker};
use crate::error::{PrepError, Result};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelineKind, PipelinePhase, PipelineSummary,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Result of one crop run
#[derive(Debug)]
pub struct CropResult {
    /// Root of the mirrored output tree
    pub output: PathBuf,
    /// One outcome per discovered image, collisions included
    pub outcomes: Vec<NormalizeOutcome>,
    /// Non-fatal scan problems
    pub scan_errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CropResult {
    pub fn normalized(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_normalized()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.normalized()
    }

    /// Outputs produced from a detected face rather than the full frame
    pub fn faces_found(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(o, NormalizeOutcome::Normalized { details, .. } if details.face_found())
            })
            .count()
    }
}

/// Configuration for a crop run
#[derive(Clone)]
pub struct CropConfig {
    /// Directories to walk
    pub inputs: Vec<PathBuf>,
    /// Root the input layout is mirrored into
    pub output: PathBuf,
    /// Upper bound on concurrent normalizations
    pub max_workers: usize,
    /// Canvas, padding and fill
    pub normalize: NormalizeConfig,
    /// Which files count as images
    pub filter: ImageFilter,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::new(),
            max_workers: default_crop_workers(),
            normalize: NormalizeConfig::default(),
            filter: ImageFilter::crop(),
        }
    }
}

/// Builder for [`CropPipeline`]
pub struct CropPipelineBuilder {
    config: CropConfig,
    detector: Arc<dyn FaceDetector>,
}

impl Default for CropPipelineBuilder {
    fn default() -> Self {
        Self {
            config: CropConfig::default(),
            detector: Arc::new(NoFaceDetector),
        }
    }
}

impl CropPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input directories
    pub fn inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.config.inputs = inputs;
        self
    }

    /// Add one input directory
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.config.inputs.push(input.into());
        self
    }

    /// Set the output root
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = output.into();
        self
    }

    /// Set the face detector (default: never finds a face)
    pub fn detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Set canvas size, face padding and fill colour
    pub fn normalize(mut self, normalize: NormalizeConfig) -> Self {
        self.config.normalize = normalize;
        self
    }

    /// Bound the number of concurrent normalizations
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Replace the extension filter
    pub fn filter(mut self, filter: ImageFilter) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn build(self) -> CropPipeline {
        CropPipeline {
            config: self.config,
            detector: self.detector,
        }
    }
}

/// Walks input trees and writes one normalized face crop per image into a
/// mirrored output tree.
pub struct CropPipeline {
    config: CropConfig,
    detector: Arc<dyn FaceDetector>,
}

impl CropPipeline {
    pub fn builder() -> CropPipelineBuilder {
        CropPipelineBuilder::new()
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Run without events
    pub fn run(&self) -> Result<CropResult> {
        self.run_with_events(&null_sender())
    }

    /// Run with event reporting.
    ///
    /// Fails only on invalid configuration or when the worker pool cannot
    /// start. Returns after every image has been processed.
    pub fn run_with_events(&self, events: &EventSender) -> Result<CropResult> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started {
            kind: PipelineKind::Crop,
        }));

        if let Err(e) = self.validate() {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
            return Err(e);
        }

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        let scan = TreeWalker::new(self.config.filter.clone()).pairs_with_events(
            &self.config.inputs,
            &self.config.output,
            events,
        );
        info!(
            "Found {} images to normalize into {}",
            scan.pairs.len(),
            self.config.output.display()
        );

        // Phase 2: Normalizing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Normalizing,
        }));
        let normalizer =
            FaceCropNormalizer::new(Arc::clone(&self.detector), self.config.normalize.clone());
        let outcomes = ProcessingWorkerPool::new(self.config.max_workers).run_with_collisions(
            &scan.pairs,
            &scan.collisions,
            &normalizer,
            events,
        )?;

        let result = CropResult {
            output: self.config.output.clone(),
            outcomes,
            scan_errors: scan.errors.iter().map(ToString::to_string).collect(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                kind: PipelineKind::Crop,
                total_items: result.outcomes.len(),
                succeeded: result.normalized(),
                failed: result.skipped(),
                duration_ms: result.duration_ms,
            },
        }));

        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        self.config.normalize.validate()?;
        if self.config.max_workers == 0 {
            return Err(PrepError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.config.output.as_os_str().is_empty() {
            return Err(PrepError::Config("no output directory given".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn builder_defaults() {
        let pipeline = CropPipeline::builder().output("/des").build();
        assert_eq!(pipeline.config().max_workers, default_crop_workers());
        assert_eq!(pipeline.config().normalize, NormalizeConfig::default());
    }

    #[test]
    fn invalid_canvas_is_fatal() {
        let result = CropPipeline::builder()
            .output("/des")
            .normalize(NormalizeConfig::default().canvas(0, 0))
            .build()
            .run();
        assert!(matches!(result, Err(PrepError::Config(_))));
    }

    #[test]
    fn missing_output_is_fatal() {
        let result = CropPipeline::builder().input("/src").build().run();
        assert!(matches!(result, Err(PrepError::Config(_))));
    }

    #[test]
    fn mirrors_into_output_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let des = temp.path().join("des");
        fs::create_dir_all(src.join("nested/deeper")).unwrap();
        RgbImage::from_pixel(50, 40, Rgb([10, 20, 30]))
            .save(src.join("nested/deeper/a.png"))
            .unwrap();

        let result = CropPipeline::builder()
            .input(&src)
            .output(&des)
            .max_workers(2)
            .build()
            .run()
            .unwrap();

        assert_eq!(result.normalized(), 1);
        assert_eq!(result.faces_found(), 0);
        assert!(des.join("nested/deeper/a.png").is_file());
    }

    #[test]
    fn collisions_are_skipped_after_the_first() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        for root in [&first, &second] {
            fs::create_dir_all(root).unwrap();
            RgbImage::new(8, 8).save(root.join("same.png")).unwrap();
        }

        let result = CropPipeline::builder()
            .inputs(vec![first, second.clone()])
            .output(temp.path().join("des"))
            .build()
            .run()
            .unwrap();

        assert_eq!(result.normalized(), 1);
        assert_eq!(result.skipped(), 1);
        let collision = result
            .outcomes
            .iter()
            .find(|o| !o.is_normalized())
            .unwrap();
        assert_eq!(collision.source(), second.join("same.png").as_path());
        assert!(matches!(
            collision,
            NormalizeOutcome::Skipped {
                error: NormalizeError::DestinationCollision { .. },
                ..
            }
        ));
    }
}
