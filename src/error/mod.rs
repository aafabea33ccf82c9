//! # Error Module
//!
//! Error types for the collect and crop pipelines.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - source paths, destinations, what went wrong
//! - **Per-item errors stay per-item** - a broken photo never aborts a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by a pipeline run.
///
/// Only the fatal cases surface here. `ScanError`, `CopyError` and
/// `NormalizeError` stay in the run result and never convert into this.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Cannot prepare target directory {path}: {source}")]
    TargetDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
}

/// Errors that occur while discovering images
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path is neither a file nor a directory: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while copying a single file
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Source has no file name: {path}")]
    NoFileName { path: PathBuf },

    #[error("Failed to copy {source_path} -> {destination}: {source}")]
    Io {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while normalizing a single image
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Face detection failed for {path}: {source}")]
    Detect {
        path: PathBuf,
        #[source]
        source: DetectorError,
    },

    #[error("Face region of {path} is empty after clamping")]
    EmptyCrop { path: PathBuf },

    #[error("Resize failed for {path}: {reason}")]
    Resize { path: PathBuf, reason: String },

    #[error("Failed to write image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination {destination} is already produced by another input")]
    DestinationCollision { destination: PathBuf },
}

/// Errors raised by a face detection backend
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to load face model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("{0}")]
    Failed(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PrepError>;
