//! Concurrent normalization of image pairs.

use crate::core::normalize::{FaceCropNormalizer, Normalized};
use crate::core::pool::build_pool;
use crate::core::scanner::ImagePair;
use crate::error::{NormalizeError, PrepError};
use crate::events::{CropEvent, Event, EventSender, ItemProgress};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// What happened to one image pair
#[derive(Debug)]
pub enum NormalizeOutcome {
    /// Written to `destination`
    Normalized {
        source: PathBuf,
        destination: PathBuf,
        details: Normalized,
    },
    /// Nothing written; the rest of the run was unaffected
    Skipped {
        source: PathBuf,
        error: NormalizeError,
    },
}

impl NormalizeOutcome {
    pub fn source(&self) -> &Path {
        match self {
            NormalizeOutcome::Normalized { source, .. }
            | NormalizeOutcome::Skipped { source, .. } => source,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, NormalizeOutcome::Normalized { .. })
    }
}

/// Runs one normalization per pair on a bounded pool.
pub struct ProcessingWorkerPool {
    max_workers: usize,
}

impl ProcessingWorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self { max_workers }
    }

    /// Normalize every pair, returning once all of them finished.
    ///
    /// Only pool construction can fail; per-image problems end up as
    /// `NormalizeOutcome::Skipped`.
    pub fn run(
        &self,
        pairs: &[ImagePair],
        normalizer: &FaceCropNormalizer,
        events: &EventSender,
    ) -> Result<Vec<NormalizeOutcome>, PrepError> {
        self.run_with_collisions(pairs, &[], normalizer, events)
    }

    /// Like [`run`](Self::run), but also records `collisions` (pairs whose
    /// destination was already claimed) as skips.
    ///
    /// Collisions count towards the progress total and the completion
    /// report, and follow the processed pairs in the returned outcomes.
    pub fn run_with_collisions(
        &self,
        pairs: &[ImagePair],
        collisions: &[ImagePair],
        normalizer: &FaceCropNormalizer,
        events: &EventSender,
    ) -> Result<Vec<NormalizeOutcome>, PrepError> {
        let pool = build_pool(self.max_workers, "crop")?;
        let total = pairs.len() + collisions.len();
        let completed = AtomicUsize::new(0);

        events.send(Event::Crop(CropEvent::Started { total }));

        let rejected: Vec<NormalizeOutcome> = collisions
            .iter()
            .map(|pair| {
                let outcome = skipped(
                    pair.source.clone(),
                    NormalizeError::DestinationCollision {
                        destination: pair.destination.clone(),
                    },
                    events,
                );
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Crop(CropEvent::Progress(ItemProgress {
                    completed: done,
                    total,
                    current_path: pair.source.clone(),
                })));
                outcome
            })
            .collect();

        let mut outcomes = pool.install(|| {
            pairs
                .par_iter()
                .map(|pair| {
                    let outcome = process_pair(pair, normalizer, events);

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Crop(CropEvent::Progress(ItemProgress {
                        completed: done,
                        total,
                        current_path: pair.source.clone(),
                    })));

                    outcome
                })
                .collect::<Vec<_>>()
        });
        outcomes.extend(rejected);

        let normalized = outcomes.iter().filter(|o| o.is_normalized()).count();
        events.send(Event::Crop(CropEvent::Completed {
            normalized,
            skipped: outcomes.len() - normalized,
        }));

        Ok(outcomes)
    }
}

fn process_pair(
    pair: &ImagePair,
    normalizer: &FaceCropNormalizer,
    events: &EventSender,
) -> NormalizeOutcome {
    match normalizer.normalize(&pair.source, &pair.destination) {
        Ok(details) => {
            info!(
                "Normalized {} -> {}",
                pair.source.display(),
                pair.destination.display()
            );
            events.send(Event::Crop(CropEvent::Normalized {
                source: pair.source.clone(),
                destination: pair.destination.clone(),
                face_found: details.face_found(),
            }));
            NormalizeOutcome::Normalized {
                source: pair.source.clone(),
                destination: pair.destination.clone(),
                details,
            }
        }
        Err(error) => skipped(pair.source.clone(), error, events),
    }
}

/// Log, announce and record a skipped item
fn skipped(
    source: PathBuf,
    error: NormalizeError,
    events: &EventSender,
) -> NormalizeOutcome {
    warn!("Skipping {}: {}", source.display(), error);
    events.send(Event::Crop(CropEvent::Skipped {
        source: source.clone(),
        message: error.to_string(),
    }));
    NormalizeOutcome::Skipped { source, error }
}
