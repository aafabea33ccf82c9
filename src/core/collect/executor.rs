//! Concurrent dedup-copy of image files into one target directory.

use crate::core::naming::NameAllocator;
use crate::core::pool::build_pool;
use crate::error::{CopyError, PrepError};
use crate::events::{CollectEvent, Event, EventSender, ItemProgress};
use rayon::prelude::*;
use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// What happened to one source file
#[derive(Debug)]
pub enum CopyOutcome {
    /// Copied under its final (possibly renamed) destination
    Copied {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Not copied; the rest of the run was unaffected
    Failed { source: PathBuf, error: CopyError },
}

impl CopyOutcome {
    pub fn source(&self) -> &Path {
        match self {
            CopyOutcome::Copied { source, .. } | CopyOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_copied(&self) -> bool {
        matches!(self, CopyOutcome::Copied { .. })
    }
}

/// Copies files on a bounded pool, naming each through a shared allocator.
pub struct CopyWorkerPool {
    max_workers: usize,
}

impl CopyWorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self { max_workers }
    }

    /// Copy every source into `target`, returning once all copies finished.
    ///
    /// Only pool construction can fail; per-file problems end up as
    /// `CopyOutcome::Failed`.
    pub fn run(
        &self,
        sources: &[PathBuf],
        target: &Path,
        allocator: &NameAllocator,
        events: &EventSender,
    ) -> Result<Vec<CopyOutcome>, PrepError> {
        let pool = build_pool(self.max_workers, "copy")?;
        let total = sources.len();
        let completed = AtomicUsize::new(0);

        events.send(Event::Collect(CollectEvent::Started {
            target: target.to_path_buf(),
            total,
        }));

        let outcomes = pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let outcome = match copy_file(source, target, allocator) {
                        Ok(destination) => {
                            info!("Copied {} -> {}", source.display(), destination.display());
                            events.send(Event::Collect(CollectEvent::Copied {
                                source: source.clone(),
                                destination: destination.clone(),
                            }));
                            CopyOutcome::Copied {
                                source: source.clone(),
                                destination,
                            }
                        }
                        Err(error) => {
                            warn!("Copy failed for {}: {}", source.display(), error);
                            events.send(Event::Collect(CollectEvent::Failed {
                                source: source.clone(),
                                message: error.to_string(),
                            }));
                            CopyOutcome::Failed {
                                source: source.clone(),
                                error,
                            }
                        }
                    };

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Collect(CollectEvent::Progress(ItemProgress {
                        completed: done,
                        total,
                        current_path: source.clone(),
                    })));

                    outcome
                })
                .collect::<Vec<_>>()
        });

        let copied = outcomes.iter().filter(|o| o.is_copied()).count();
        events.send(Event::Collect(CollectEvent::Completed {
            copied,
            failed: outcomes.len() - copied,
        }));

        Ok(outcomes)
    }
}

/// Copy one file into `target` under a name claimed from `allocator`.
///
/// Bytes, permissions and modification/access times are carried over.
/// Times are set while the new file is still writable, before a read-only
/// mode from the source is applied.
pub fn copy_file(
    source: &Path,
    target: &Path,
    allocator: &NameAllocator,
) -> Result<PathBuf, CopyError> {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CopyError::NoFileName {
            path: source.to_path_buf(),
        })?;

    let destination = target.join(allocator.allocate(&file_name));

    copy_contents(source, &destination).map_err(|e| CopyError::Io {
        source_path: source.to_path_buf(),
        destination: destination.clone(),
        source: e,
    })?;

    Ok(destination)
}

fn copy_contents(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let metadata = reader.metadata()?;

    let mut writer = File::create(destination)?;
    io::copy(&mut reader, &mut writer)?;

    if let Err(e) = file_times(&metadata).and_then(|times| writer.set_times(times)) {
        debug!(
            "Could not carry timestamps to {}: {}",
            destination.display(),
            e
        );
    }
    drop(writer);

    fs::set_permissions(destination, metadata.permissions())
}

fn file_times(metadata: &Metadata) -> io::Result<FileTimes> {
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use std::fs::OpenOptions;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn copy_is_byte_identical() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let content: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let source = src.path().join("frame.png");
        fs::write(&source, &content).unwrap();

        let allocator = NameAllocator::default();
        let destination = copy_file(&source, dst.path(), &allocator).unwrap();

        assert_eq!(destination, dst.path().join("frame.png"));
        assert_eq!(fs::read(&destination).unwrap(), content);
        assert!(source.exists());
    }

    #[test]
    fn copy_carries_modification_time() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let source = src.path().join("old.jpg");
        fs::write(&source, b"old").unwrap();
        let past = SystemTime::now() - Duration::from_secs(86_400 * 30);
        OpenOptions::new()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let destination = copy_file(&source, dst.path(), &NameAllocator::default()).unwrap();

        let copied = fs::metadata(&destination).unwrap().modified().unwrap();
        let delta = copied
            .duration_since(past)
            .unwrap_or_else(|e| e.duration());
        assert!(delta < Duration::from_secs(2));
    }

    #[test]
    fn read_only_source_keeps_its_time_and_mode() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let source = src.path().join("locked.jpg");
        fs::write(&source, b"locked").unwrap();
        let past = SystemTime::now() - Duration::from_secs(86_400 * 30);
        OpenOptions::new()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();
        let mut permissions = fs::metadata(&source).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&source, permissions).unwrap();

        let destination = copy_file(&source, dst.path(), &NameAllocator::default()).unwrap();

        let metadata = fs::metadata(&destination).unwrap();
        assert!(metadata.permissions().readonly());
        assert_eq!(fs::read(&destination).unwrap(), b"locked");
        let delta = metadata
            .modified()
            .unwrap()
            .duration_since(past)
            .unwrap_or_else(|e| e.duration());
        assert!(delta < Duration::from_secs(2));
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dst = TempDir::new().unwrap();
        let result = copy_file(
            Path::new("/nonexistent/photo.jpg"),
            dst.path(),
            &NameAllocator::default(),
        );
        assert!(matches!(result, Err(CopyError::Io { .. })));
    }

    #[test]
    fn pool_renames_same_named_sources() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(a.path().join("photo.jpg"), b"first").unwrap();
        fs::write(b.path().join("photo.jpg"), b"second").unwrap();
        fs::write(dst.path().join("photo.jpg"), b"existing").unwrap();

        let allocator = NameAllocator::from_directory(dst.path()).unwrap();
        let sources = vec![a.path().join("photo.jpg"), b.path().join("photo.jpg")];
        let outcomes = CopyWorkerPool::new(4)
            .run(&sources, dst.path(), &allocator, &null_sender())
            .unwrap();

        assert!(outcomes.iter().all(CopyOutcome::is_copied));
        assert_eq!(fs::read(dst.path().join("photo.jpg")).unwrap(), b"existing");
        let mut renamed = vec![
            fs::read(dst.path().join("photo_1.jpg")).unwrap(),
            fs::read(dst.path().join("photo_2.jpg")).unwrap(),
        ];
        renamed.sort();
        assert_eq!(renamed, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn one_failure_does_not_stop_the_pool() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("good.jpg"), b"ok").unwrap();

        let sources = vec![src.path().join("gone.jpg"), src.path().join("good.jpg")];
        let outcomes = CopyWorkerPool::new(2)
            .run(&sources, dst.path(), &NameAllocator::default(), &null_sender())
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.iter().filter(|o| o.is_copied()).count(), 1);
        assert!(dst.path().join("good.jpg").exists());
    }
}
