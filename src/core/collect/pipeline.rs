//! Collect pipeline: scan sources, then dedup-copy into the target.

use super::executor::{CopyOutcome, CopyWorkerPool};
use crate::core::naming::NameAllocator;
use crate::core::pool::DEFAULT_COPY_WORKERS;
use crate::core::scanner::{ImageFilter, PathScanner};
use crate::error::{PrepError, Result};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelineKind, PipelinePhase, PipelineSummary,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Result of one collect run
#[derive(Debug)]
pub struct CollectResult {
    /// Directory the images were copied into
    pub target: PathBuf,
    /// One outcome per discovered image
    pub outcomes: Vec<CopyOutcome>,
    /// Non-fatal scan problems (missing roots, unreadable entries)
    pub scan_errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CollectResult {
    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_copied()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.copied()
    }
}

/// Configuration for a collect run
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Directory every image is copied into (created if absent)
    pub target: PathBuf,
    /// Files and directories to gather images from
    pub sources: Vec<PathBuf>,
    /// Upper bound on concurrent copies
    pub max_workers: usize,
    /// Which files count as images
    pub filter: ImageFilter,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::new(),
            sources: Vec::new(),
            max_workers: DEFAULT_COPY_WORKERS,
            filter: ImageFilter::collect(),
        }
    }
}

/// Builder for [`CollectPipeline`]
#[derive(Default)]
pub struct CollectPipelineBuilder {
    config: CollectConfig,
}

impl CollectPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target directory
    pub fn target(mut self, target: impl Into<PathBuf>) -> Self {
        self.config.target = target.into();
        self
    }

    /// Set the source files and directories
    pub fn sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.config.sources = sources;
        self
    }

    /// Bound the number of concurrent copies
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Replace the extension filter
    pub fn filter(mut self, filter: ImageFilter) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn build(self) -> CollectPipeline {
        CollectPipeline {
            config: self.config,
        }
    }
}

/// Gathers images from many places into one flat directory without
/// overwriting anything.
pub struct CollectPipeline {
    config: CollectConfig,
}

impl CollectPipeline {
    pub fn builder() -> CollectPipelineBuilder {
        CollectPipelineBuilder::new()
    }

    pub fn config(&self) -> &CollectConfig {
        &self.config
    }

    /// Run without events
    pub fn run(&self) -> Result<CollectResult> {
        self.run_with_events(&null_sender())
    }

    /// Run with event reporting.
    ///
    /// Fails only when the target directory cannot be created or listed, or
    /// the worker pool cannot start. Returns after every copy has finished.
    pub fn run_with_events(&self, events: &EventSender) -> Result<CollectResult> {
        let start_time = Instant::now();
        let target = &self.config.target;

        events.send(Event::Pipeline(PipelineEvent::Started {
            kind: PipelineKind::Collect,
        }));

        let allocator = match prepare_target(target) {
            Ok(allocator) => allocator,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e);
            }
        };

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        let scan = PathScanner::new(self.config.filter.clone())
            .scan_with_events(&self.config.sources, events);
        info!(
            "Found {} images to copy into {}",
            scan.images.len(),
            target.display()
        );

        // Phase 2: Copying
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Copying,
        }));
        let outcomes = CopyWorkerPool::new(self.config.max_workers).run(
            &scan.images,
            target,
            &allocator,
            events,
        )?;

        let result = CollectResult {
            target: target.clone(),
            outcomes,
            scan_errors: scan.errors.iter().map(ToString::to_string).collect(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                kind: PipelineKind::Collect,
                total_items: result.outcomes.len(),
                succeeded: result.copied(),
                failed: result.failed(),
                duration_ms: result.duration_ms,
            },
        }));

        Ok(result)
    }
}

/// Create the target if needed and seed an allocator from its contents
fn prepare_target(target: &Path) -> Result<NameAllocator> {
    if !target.is_dir() {
        fs::create_dir_all(target).map_err(|source| PrepError::TargetDirectory {
            path: target.to_path_buf(),
            source,
        })?;
        info!("Created target directory {}", target.display());
    }

    NameAllocator::from_directory(target).map_err(|source| PrepError::TargetDirectory {
        path: target.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builder_keeps_settings() {
        let pipeline = CollectPipeline::builder()
            .target("/train/0_real")
            .sources(vec![PathBuf::from("/frames/a")])
            .max_workers(3)
            .build();

        assert_eq!(pipeline.config().target, PathBuf::from("/train/0_real"));
        assert_eq!(pipeline.config().max_workers, 3);
    }

    #[test]
    fn default_worker_bound_is_twenty() {
        let pipeline = CollectPipeline::builder().build();
        assert_eq!(pipeline.config().max_workers, DEFAULT_COPY_WORKERS);
    }

    #[test]
    fn creates_missing_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out/nested");

        let result = CollectPipeline::builder()
            .target(&target)
            .sources(vec![])
            .build()
            .run()
            .unwrap();

        assert!(target.is_dir());
        assert!(result.outcomes.is_empty());
    }

    #[test]
    fn target_that_is_a_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("occupied");
        fs::write(&target, b"not a dir").unwrap();

        let result = CollectPipeline::builder().target(&target).build().run();

        assert!(matches!(result, Err(PrepError::TargetDirectory { .. })));
    }

    #[test]
    fn missing_source_is_recorded() {
        let temp = TempDir::new().unwrap();
        let result = CollectPipeline::builder()
            .target(temp.path().join("out"))
            .sources(vec![temp.path().join("nowhere")])
            .build()
            .run()
            .unwrap();

        assert_eq!(result.scan_errors.len(), 1);
        assert_eq!(result.copied(), 0);
    }
}
