//! Flat image discovery over a mix of files and directories.

use super::{filter::ImageFilter, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Collects every matching image under a list of roots.
///
/// File roots are taken as-is when they match the filter; directory roots
/// are walked recursively. Anything else is reported and skipped.
pub struct PathScanner {
    filter: ImageFilter,
}

impl PathScanner {
    /// Create a scanner with the given filter
    pub fn new(filter: ImageFilter) -> Self {
        Self { filter }
    }

    /// Scan roots without progress reporting
    pub fn scan(&self, roots: &[PathBuf]) -> ScanResult {
        self.scan_with_events(roots, &null_sender())
    }

    /// Scan roots, emitting a `ScanEvent` per discovery and per problem
    pub fn scan_with_events(&self, roots: &[PathBuf], events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            paths: roots.to_vec(),
        }));

        let mut result = ScanResult::default();

        for root in roots {
            if root.is_file() {
                if self.filter.should_include(root) {
                    found(root, events);
                    result.images.push(root.clone());
                }
            } else if root.is_dir() {
                let images = &mut result.images;
                walk_images(
                    root,
                    &self.filter,
                    events,
                    |path| images.push(path.to_path_buf()),
                    &mut result.errors,
                );
            } else {
                report(
                    ScanError::NotFound { path: root.clone() },
                    root,
                    events,
                    &mut result.errors,
                );
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: result.images.len(),
        }));

        result
    }
}

impl Default for PathScanner {
    fn default() -> Self {
        Self::new(ImageFilter::collect())
    }
}

/// Walk one directory recursively, handing every matching file to `on_image`.
///
/// Directory symlinks are not descended into, but a symlink to a file is
/// taken like the file itself. Unreadable entries are recorded in `errors`
/// and the walk continues.
pub(super) fn walk_images<F>(
    root: &Path,
    filter: &ImageFilter,
    events: &EventSender,
    mut on_image: F,
    errors: &mut Vec<ScanError>,
) where
    F: FnMut(&Path),
{
    for entry_result in WalkDir::new(root).follow_links(false) {
        match entry_result {
            Ok(entry) => {
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if !is_file || !filter.should_include(entry.path()) {
                    continue;
                }
                found(entry.path(), events);
                on_image(entry.path());
            }
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                let error = if e.io_error().map(io::Error::kind)
                    == Some(io::ErrorKind::PermissionDenied)
                {
                    ScanError::PermissionDenied { path: path.clone() }
                } else {
                    ScanError::ReadDirectory {
                        path: path.clone(),
                        source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                    }
                };
                report(error, &path, events, errors);
            }
        }
    }
}

fn found(path: &Path, events: &EventSender) {
    debug!("Found image: {}", path.display());
    events.send(Event::Scan(ScanEvent::ImageFound {
        path: path.to_path_buf(),
    }));
}

pub(super) fn report(
    error: ScanError,
    path: &Path,
    events: &EventSender,
    errors: &mut Vec<ScanError>,
) {
    warn!("{}", error);
    events.send(Event::Scan(ScanEvent::Error {
        path: path.to_path_buf(),
        message: error.to_string(),
    }));
    errors.push(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn scan_empty_directory_returns_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let result = PathScanner::default().scan(&[temp_dir.path().to_path_buf()]);

        assert!(result.images.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_walks_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("root.jpg"));
        touch(&temp_dir.path().join("a/b/deep.PNG"));
        touch(&temp_dir.path().join("a/readme.txt"));

        let result = PathScanner::default().scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(result.images.len(), 2);
        assert!(result.images.iter().any(|p| p.ends_with("a/b/deep.PNG")));
    }

    #[test]
    fn file_roots_are_taken_directly() {
        let temp_dir = TempDir::new().unwrap();
        let photo = temp_dir.path().join("single.webp");
        let note = temp_dir.path().join("note.md");
        touch(&photo);
        touch(&note);

        let result = PathScanner::default().scan(&[photo.clone(), note]);

        assert_eq!(result.images, vec![photo]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn missing_root_is_reported_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("kept.jpg"));

        let result = PathScanner::default().scan(&[
            PathBuf::from("/nonexistent/path/12345"),
            temp_dir.path().to_path_buf(),
        ]);

        assert_eq!(result.images.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ScanError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_inside_a_root_are_found() {
        let store = TempDir::new().unwrap();
        let temp_dir = TempDir::new().unwrap();
        touch(&store.path().join("real.jpg"));
        fs::create_dir_all(store.path().join("album")).unwrap();
        touch(&store.path().join("album/inner.png"));
        std::os::unix::fs::symlink(store.path().join("real.jpg"), temp_dir.path().join("link.jpg"))
            .unwrap();
        std::os::unix::fs::symlink(store.path().join("album"), temp_dir.path().join("album"))
            .unwrap();
        std::os::unix::fs::symlink(
            store.path().join("gone.jpg"),
            temp_dir.path().join("dangling.jpg"),
        )
        .unwrap();

        let result = PathScanner::default().scan(&[temp_dir.path().to_path_buf()]);

        assert_eq!(result.images, vec![temp_dir.path().join("link.jpg")]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_emits_found_events() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("one.gif"));

        let (sender, receiver) = crate::events::EventChannel::new();
        PathScanner::default().scan_with_events(&[temp_dir.path().to_path_buf()], &sender);
        drop(sender);

        let found: Vec<_> = receiver
            .iter()
            .filter(|e| matches!(e, Event::Scan(ScanEvent::ImageFound { .. })))
            .collect();
        assert_eq!(found.len(), 1);
    }
}
