//! Batches of collect jobs read from a JSON manifest.
//!
//! ```json
//! [
//!   { "target": "/train/0_real", "sources": ["/frames/real", "/frames/youtube"] },
//!   { "target": "/train/1_fake", "sources": ["/frames/synthesis"] }
//! ]
//! ```

use super::pipeline::{CollectPipeline, CollectResult};
use crate::error::{PrepError, Result};
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One target directory and the places to gather images from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectJob {
    pub target: PathBuf,
    pub sources: Vec<PathBuf>,
}

impl CollectJob {
    pub fn pipeline(&self, max_workers: usize) -> CollectPipeline {
        CollectPipeline::builder()
            .target(&self.target)
            .sources(self.sources.clone())
            .max_workers(max_workers)
            .build()
    }
}

/// Read and validate a manifest file
pub fn load_manifest(path: &Path) -> Result<Vec<CollectJob>> {
    let text = fs::read_to_string(path).map_err(|e| PrepError::Manifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_manifest(&text).map_err(|reason| PrepError::Manifest {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_manifest(text: &str) -> std::result::Result<Vec<CollectJob>, String> {
    let jobs: Vec<CollectJob> = serde_json::from_str(text).map_err(|e| e.to_string())?;
    if jobs.is_empty() {
        return Err("manifest lists no jobs".to_string());
    }
    if let Some(index) = jobs.iter().position(|job| job.sources.is_empty()) {
        return Err(format!("job {} has no sources", index + 1));
    }
    Ok(jobs)
}

/// Run jobs one after another; a job starts only once the previous pool drained.
///
/// The first fatal error stops the batch.
pub fn run_jobs(
    jobs: &[CollectJob],
    max_workers: usize,
    events: &EventSender,
) -> Result<Vec<CollectResult>> {
    let mut results = Vec::with_capacity(jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        info!(
            "Job {}/{}: {} source(s) -> {}",
            index + 1,
            jobs.len(),
            job.sources.len(),
            job.target.display()
        );
        results.push(job.pipeline(max_workers).run_with_events(events)?);
    }
    Ok(results)
}
