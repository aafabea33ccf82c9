//! # Naming Module
//!
//! Collision-free filenames inside one target directory.
//!
//! A [`NameAllocator`] is seeded with the names already in the directory and
//! hands out names that are neither present nor previously handed out. The
//! check and the claim happen under one lock, so concurrent workers asking
//! for the same name always get different answers:
//!
//! ```text
//! photo.jpg  (exists)     allocate("photo.jpg") -> photo_1.jpg
//!                         allocate("photo.jpg") -> photo_2.jpg
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Hands out unique filenames for one target directory.
///
/// The set only grows; it lives for one pipeline run and is never persisted.
#[derive(Debug, Default)]
pub struct NameAllocator {
    names: Mutex<HashSet<String>>,
}

impl NameAllocator {
    /// Create an allocator that treats `existing` as already taken
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Mutex::new(existing.into_iter().map(Into::into).collect()),
        }
    }

    /// Seed from the current listing of `dir`
    pub fn from_directory(dir: &Path) -> io::Result<Self> {
        let mut names = HashSet::new();
        for entry in fs::read_dir(dir)? {
            names.insert(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(Self {
            names: Mutex::new(names),
        })
    }

    /// Claim `desired`, or the first free `{stem}_{n}{ext}` with n = 1, 2, ...
    pub fn allocate(&self, desired: &str) -> String {
        let mut names = self.lock();

        if !names.contains(desired) {
            names.insert(desired.to_string());
            return desired.to_string();
        }

        let (stem, ext) = split_extension(desired);
        let mut counter = 1u64;
        loop {
            let candidate = format!("{stem}_{counter}{ext}");
            if !names.contains(&candidate) {
                names.insert(candidate.clone());
                return candidate;
            }
            counter += 1;
        }
    }

    /// Whether `name` is taken
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Number of taken names
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic elsewhere cannot leave the set half-updated: every mutation is
    // a single insert.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Split a filename into stem and extension, keeping the dot on the extension.
///
/// Leading dots belong to the stem, so `.bashrc` has no extension and
/// `archive.tar.gz` splits into `archive.tar` and `.gz`.
pub fn split_extension(name: &str) -> (&str, &str) {
    let body_start = name.len() - name.trim_start_matches('.').len();
    match name[body_start..].rfind('.') {
        Some(idx) => name.split_at(body_start + idx),
        None => (name, ""),
    }
}
