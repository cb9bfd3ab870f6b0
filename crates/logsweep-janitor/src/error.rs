//! Error types for Janitor operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during Janitor operations
///
/// None of these ever terminate the service: the engine catches them at the
/// pass boundary and reports them through the event sink.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Filesystem error outside of a single file deletion
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was working on
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failed while enumerating log files
    #[error("Failed to enumerate log files: {0}")]
    Walk(#[from] walkdir::Error),

    /// Settings source could not be read
    #[error("Settings error: {0}")]
    Settings(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl JanitorError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
