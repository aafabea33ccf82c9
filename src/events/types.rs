//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the collect and crop pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Image discovery events
    Scan(ScanEvent),
    /// Dedup-copy events
    Collect(CollectEvent),
    /// Face crop and normalize events
    Crop(CropEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during image discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// An image was found
    ImageFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_images: usize },
}

/// Events while copying images into a target directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CollectEvent {
    /// Copying has started
    Started { target: PathBuf, total: usize },
    /// One item finished (either way)
    Progress(ItemProgress),
    /// A file was copied under its final name
    Copied {
        source: PathBuf,
        destination: PathBuf,
    },
    /// A file could not be copied; the run continues
    Failed { source: PathBuf, message: String },
    /// All items finished
    Completed { copied: usize, failed: usize },
}

/// Events while normalizing face crops
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CropEvent {
    /// Processing has started
    Started { total: usize },
    /// One item finished (either way)
    Progress(ItemProgress),
    /// An image was written to its destination
    Normalized {
        source: PathBuf,
        destination: PathBuf,
        face_found: bool,
    },
    /// An image was skipped; the run continues
    Skipped { source: PathBuf, message: String },
    /// All items finished
    Completed { normalized: usize, skipped: usize },
}

/// Progress information shared by both worker pools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemProgress {
    /// Number of items finished so far
    pub completed: usize,
    /// Total number of items submitted
    pub total: usize,
    /// Item that just finished
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started { kind: PipelineKind },
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Which pipeline is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineKind {
    Collect,
    Crop,
}

/// Phases of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Copying,
    Normalizing,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Pipeline that produced this summary
    pub kind: PipelineKind,
    /// Items submitted to the worker pool
    pub total_items: usize,
    /// Items that produced an output file
    pub succeeded: usize,
    /// Items that were skipped or failed
    pub failed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Copying => write!(f, "Copying"),
            PipelinePhase::Normalizing => write!(f, "Normalizing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Collect(CollectEvent::Progress(ItemProgress {
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/photos/a.jpg"),
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Collect(CollectEvent::Progress(p)) => {
                assert_eq!(p.completed, 10);
                assert_eq!(p.total, 50);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn pipeline_summary_is_serializable() {
        let summary = PipelineSummary {
            kind: PipelineKind::Crop,
            total_items: 1200,
            succeeded: 1180,
            failed: 20,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("1180"));
        assert!(json.contains("Crop"));
    }
}
