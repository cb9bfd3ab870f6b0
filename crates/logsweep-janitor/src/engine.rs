//! Core cleanup pass

use crate::config::{ConfigStore, Configuration};
use crate::fs::{Filesystem, LocalFilesystem, LogFileEntry, LOG_EXTENSION};
use crate::metrics::{JanitorMetrics, PassOutcome, PassReport};
use crate::settings::SettingsSource;
use crate::sink::{EventSink, Severity, TracingSink};
use crate::JanitorError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Deletes stale log files under the configured root
///
/// Each call to [`run_pass`](Self::run_pass) refreshes the configuration,
/// enumerates `*.log` files oldest-accessed first and deletes those past
/// retention, plus as many extra as it takes to get free space back above
/// the low-disk threshold.
///
/// # Examples
///
/// ```no_run
/// use logsweep_janitor::{CleanupEngine, TomlFileSource};
/// use std::sync::Arc;
///
/// let mut engine = CleanupEngine::with_defaults(Arc::new(TomlFileSource::new("logsweep.toml")));
/// let report = engine.run_pass();
/// println!("{}", report.summary());
/// ```
pub struct CleanupEngine {
    store: ConfigStore,
    fs: Arc<dyn Filesystem>,
    sink: Arc<dyn EventSink>,
    metrics: JanitorMetrics,
}

impl CleanupEngine {
    /// Create an engine from its collaborators
    pub fn new(store: ConfigStore, fs: Arc<dyn Filesystem>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            fs,
            sink,
            metrics: JanitorMetrics::new(),
        }
    }

    /// Engine on the local filesystem reporting through `tracing`
    pub fn with_defaults(source: Arc<dyn SettingsSource>) -> Self {
        Self::new(
            ConfigStore::new(source),
            Arc::new(LocalFilesystem),
            Arc::new(TracingSink),
        )
    }

    /// Configuration used by the latest pass
    pub fn config(&self) -> Arc<Configuration> {
        self.store.current()
    }

    /// The underlying configuration store
    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    /// The event sink passes report to
    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Run one cleanup pass
    ///
    /// Never fails. Per-file deletion errors are reported and skipped; any
    /// other error ends the pass early with [`PassOutcome::Aborted`].
    pub fn run_pass(&mut self) -> PassReport {
        let start = Instant::now();
        let mut report = PassReport::default();

        if let Err(e) = self.sweep(SystemTime::now(), &mut report) {
            report.outcome = PassOutcome::Aborted;
            self.sink
                .write_entry(&format!("Error running cleanup pass: {}", e), Severity::Error);
        }

        let elapsed = start.elapsed();
        self.metrics.record_pass(&report, elapsed);
        tracing::debug!("Pass finished in {:?}: {}", elapsed, report.summary());

        report
    }

    fn sweep(&self, now: SystemTime, report: &mut PassReport) -> Result<(), JanitorError> {
        let previous_interval = self.store.current().interval_minutes;
        let (config, changes) = self.store.refresh();

        for change in &changes {
            self.sink.write_entry(&change.to_string(), Severity::Information);
        }
        if config.interval_minutes != previous_interval {
            report.interval_changed = Some(config.interval());
        }
        report.changes = changes;

        let root = &config.root_directory;
        if !self.fs.is_dir(root) {
            report.outcome = PassOutcome::RootMissing;
            self.sink.write_entry(
                &format!("{} not exists, nothing to do", root.display()),
                Severity::Warning,
            );
            return Ok(());
        }

        self.sink
            .write_entry(&format!("cleaning {}", root.display()), Severity::Information);

        let candidates = self.candidates(root)?;
        report.scanned = candidates.len();

        let cutoff = now.checked_sub(config.retention()).unwrap_or(UNIX_EPOCH);

        for entry in candidates {
            if !self.fs.exists(&entry.path) {
                report.vanished += 1;
                continue;
            }

            let expired = entry.last_write < cutoff;
            let low_disk = !expired && self.low_disk_for(&config);
            if !expired && !low_disk {
                continue;
            }

            match self.fs.remove_file(&entry.path) {
                Ok(()) => {
                    report.deleted += 1;
                    report.bytes_reclaimed += entry.len;
                    if low_disk {
                        report.deleted_for_low_disk += 1;
                    }
                    tracing::debug!(
                        path = %entry.path.display(),
                        low_disk,
                        "Deleted log file"
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    report.vanished += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    self.sink.write_entry(
                        &format!("Error deleting log file: {}. {}", entry.path.display(), e),
                        Severity::Error,
                    );
                }
            }
        }

        Ok(())
    }

    /// Fresh candidate list, oldest access first
    ///
    /// Ties are broken by path so the deletion order is reproducible.
    fn candidates(&self, root: &Path) -> Result<Vec<LogFileEntry>, JanitorError> {
        let mut candidates = self.fs.find_logs(root, LOG_EXTENSION)?;
        candidates.sort_by(|a, b| {
            a.last_access
                .cmp(&b.last_access)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(candidates)
    }

    /// Whether free space on the log volume is below the threshold
    ///
    /// Uses the configuration from the latest refresh. Any failure to
    /// inspect the volume is reported and counts as "not low".
    pub fn is_low_disk_threshold_crossed(&self) -> bool {
        self.low_disk_for(&self.store.current())
    }

    fn low_disk_for(&self, config: &Configuration) -> bool {
        let configured = &config.root_directory;

        let resolved = match self.fs.resolve(configured) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.report_disk_check_failure(configured, configured, &e);
                return false;
            }
        };

        match self.fs.available_space(&resolved) {
            Ok(bytes) => {
                let available_mb = bytes / BYTES_PER_MB;
                tracing::trace!(available_mb, threshold_mb = config.low_disk_threshold_mb);
                available_mb < config.low_disk_threshold_mb
            }
            Err(e) => {
                self.report_disk_check_failure(configured, &resolved, &e);
                false
            }
        }
    }

    fn report_disk_check_failure(&self, configured: &Path, resolved: &Path, e: &io::Error) {
        self.sink.write_entry(
            &format!(
                "LowDiskThreshold check failed root:{} raw path:{} path:{} error:{}",
                volume_root(resolved).display(),
                configured.display(),
                resolved.display(),
                e
            ),
            Severity::Error,
        );
    }
}

/// Topmost ancestor of a path (`/`, `C:\`, ...)
fn volume_root(path: &Path) -> PathBuf {
    path.ancestors()
        .last()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
