//! Error types for the daemon.

use logsweep_janitor::JanitorError;
use thiserror::Error;

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;

/// Errors that end the daemon process.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Logging could not be initialized
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// Signal handler could not be installed or polled
    #[error("Signal handling error: {0}")]
    Signal(#[source] std::io::Error),

    /// Janitor service error
    #[error("Janitor error: {0}")]
    Janitor(#[from] JanitorError),

    /// A `--once` pass ended early
    #[error("Cleanup pass aborted: {0}")]
    PassAborted(String),
}
