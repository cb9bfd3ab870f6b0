//! Metrics collection for Janitor operations

use crate::config::ChangeNotice;
use std::time::Duration;

/// How a pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassOutcome {
    /// The log tree was swept
    #[default]
    Completed,
    /// The root directory does not exist; nothing was scanned
    RootMissing,
    /// An unexpected error ended the pass early
    Aborted,
}

/// Result of a single cleanup pass
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// How the pass ended
    pub outcome: PassOutcome,

    /// Configuration fields that changed at the start of the pass
    pub changes: Vec<ChangeNotice>,

    /// New pass interval, if the refresh changed it
    pub interval_changed: Option<Duration>,

    /// Log files enumerated
    pub scanned: usize,

    /// Files deleted (retention and low-disk together)
    pub deleted: usize,

    /// Of `deleted`, files only removed because disk space was low
    pub deleted_for_low_disk: usize,

    /// Files that qualified for deletion but could not be removed
    pub failed: usize,

    /// Files that disappeared between enumeration and deletion
    pub vanished: usize,

    /// Bytes freed by successful deletions
    pub bytes_reclaimed: u64,
}

impl PassReport {
    /// One-line description of the pass
    pub fn summary(&self) -> String {
        match self.outcome {
            PassOutcome::RootMissing => "root directory missing, nothing scanned".to_string(),
            PassOutcome::Aborted => format!(
                "aborted after {} deleted, {} failed",
                self.deleted, self.failed
            ),
            PassOutcome::Completed => format!(
                "{} scanned, {} deleted ({} for low disk), {} failed, {} bytes reclaimed",
                self.scanned,
                self.deleted,
                self.deleted_for_low_disk,
                self.failed,
                self.bytes_reclaimed
            ),
        }
    }
}

/// Metrics accumulated across passes
#[derive(Debug, Clone, Default)]
pub struct JanitorMetrics {
    /// Total passes run
    pub pass_count: usize,

    /// Passes that ended early on an error
    pub aborted_count: usize,

    /// Passes skipped because the root directory was missing
    pub root_missing_count: usize,

    /// Files deleted across all passes
    pub deleted: usize,

    /// Files deleted only to relieve low disk space
    pub deleted_for_low_disk: usize,

    /// Failed deletions
    pub failed: usize,

    /// Bytes reclaimed
    pub bytes_reclaimed: u64,

    /// Total time spent in passes
    pub total_runtime: Duration,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished pass into the totals
    pub fn record_pass(&mut self, report: &PassReport, elapsed: Duration) {
        self.pass_count += 1;
        match report.outcome {
            PassOutcome::Aborted => self.aborted_count += 1,
            PassOutcome::RootMissing => self.root_missing_count += 1,
            PassOutcome::Completed => {}
        }
        self.deleted += report.deleted;
        self.deleted_for_low_disk += report.deleted_for_low_disk;
        self.failed += report.failed;
        self.bytes_reclaimed += report.bytes_reclaimed;
        self.total_runtime += elapsed;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Log Sweep Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Passes: {}", self.pass_count),
            format!("  Aborted: {}", self.aborted_count),
            format!("  Root missing: {}", self.root_missing_count),
            format!("Total runtime: {:.1}s", self.total_runtime.as_secs_f64()),
            format!("Deleted: {}", self.deleted),
            format!("  For low disk: {}", self.deleted_for_low_disk),
            format!("Failed deletions: {}", self.failed),
            format!("Bytes reclaimed: {}", self.bytes_reclaimed),
        ];
        lines.join("\n")
    }
}
