//! Mirrored source/destination pairing for the crop pipeline.

use super::filter::ImageFilter;
use super::walker::{report, walk_images};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One image to normalize and where its output goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of walking the input trees
#[derive(Debug, Default)]
pub struct TreeScan {
    /// Pairs to process, each with a distinct destination
    pub pairs: Vec<ImagePair>,
    /// Pairs whose destination was already taken by an earlier pair
    pub collisions: Vec<ImagePair>,
    /// Non-fatal problems met while walking
    pub errors: Vec<ScanError>,
}

/// Walks input directories and mirrors each image path under an output root.
///
/// `input/sub/dir/x.jpg` maps to `output/sub/dir/x.jpg`. Several inputs
/// may share one output root; the first input to claim a destination keeps
/// it and later claimants land in `collisions`.
pub struct TreeWalker {
    filter: ImageFilter,
}

impl TreeWalker {
    pub fn new(filter: ImageFilter) -> Self {
        Self { filter }
    }

    pub fn pairs(&self, inputs: &[PathBuf], output: &Path) -> TreeScan {
        self.pairs_with_events(inputs, output, &null_sender())
    }

    pub fn pairs_with_events(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        events: &EventSender,
    ) -> TreeScan {
        events.send(Event::Scan(ScanEvent::Started {
            paths: inputs.to_vec(),
        }));

        let mut scan = TreeScan::default();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for root in inputs {
            if !root.is_dir() {
                report(
                    ScanError::NotFound { path: root.clone() },
                    root,
                    events,
                    &mut scan.errors,
                );
                continue;
            }

            let mut found = Vec::new();
            walk_images(
                root,
                &self.filter,
                events,
                |path| found.push(path.to_path_buf()),
                &mut scan.errors,
            );

            for source in found {
                let destination = mirror(root, &source, output);
                let pair = ImagePair {
                    source,
                    destination,
                };
                if claimed.insert(pair.destination.clone()) {
                    scan.pairs.push(pair);
                } else {
                    warn!(
                        "{} maps onto {} which another input already produces",
                        pair.source.display(),
                        pair.destination.display()
                    );
                    scan.collisions.push(pair);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: scan.pairs.len() + scan.collisions.len(),
        }));

        scan
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(ImageFilter::crop())
    }
}

/// Destination of `source` (found under `root`) inside `output`
pub fn mirror(root: &Path, source: &Path, output: &Path) -> PathBuf {
    match source.strip_prefix(root) {
        Ok(relative) => output.join(relative),
        Err(_) => output.join(source.file_name().unwrap_or(source.as_os_str())),
    }
}
