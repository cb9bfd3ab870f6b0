//! Configuration for Janitor operations
//!
//! The effective configuration is an immutable [`Configuration`] snapshot.
//! [`ConfigStore::refresh`] builds a new snapshot from the settings source,
//! publishes it wholesale and reports which fields changed.

use crate::settings::{
    Settings, SettingsSource, CHECK_INTERVAL_MINUTES, DAYS_TO_KEEP, LOW_DISK_THRESHOLD_MB,
    ROOT_LOG_SEARCH_DIRECTORY,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default log root before placeholder expansion
#[cfg(windows)]
pub const DEFAULT_ROOT_LOG_SEARCH_DIRECTORY: &str = r"%SystemDrive%\inetpub\logs";

/// Default log root before placeholder expansion
#[cfg(not(windows))]
pub const DEFAULT_ROOT_LOG_SEARCH_DIRECTORY: &str = "/inetpub/logs";

/// Default retention in days since last write
pub const DEFAULT_DAYS_TO_KEEP: u64 = 7;

/// Default check interval in minutes
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 15;

/// Longest accepted check interval in minutes (366 days)
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 366 * 24 * 60;

/// Default low-disk threshold in megabytes
pub const DEFAULT_LOW_DISK_THRESHOLD_MB: u64 = 1000;

/// Effective configuration for one cleanup pass
///
/// # Examples
///
/// ```
/// use logsweep_janitor::Configuration;
/// use std::time::Duration;
///
/// let config = Configuration::default();
/// assert_eq!(config.retention_days, 7);
/// assert_eq!(config.interval(), Duration::from_secs(15 * 60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Directory searched recursively for `*.log` files (placeholders expanded)
    pub root_directory: PathBuf,

    /// Files last written more than this many days ago are deleted
    pub retention_days: u64,

    /// Minutes between passes, within `1..=MAX_CHECK_INTERVAL_MINUTES`
    pub interval_minutes: u64,

    /// Below this much free space (MB) files are deleted oldest-accessed first
    pub low_disk_threshold_mb: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_settings(&Settings::new(), process_env)
    }
}

impl Configuration {
    /// Build a configuration from raw settings
    ///
    /// Every field independently falls back to its default when the setting
    /// is missing, blank or unparseable. An interval of zero or above
    /// [`MAX_CHECK_INTERVAL_MINUTES`] also takes the default. `env` resolves placeholder names in
    /// the root directory.
    pub fn from_settings<F>(settings: &Settings, env: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let root = settings
            .get(ROOT_LOG_SEARCH_DIRECTORY)
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .unwrap_or(DEFAULT_ROOT_LOG_SEARCH_DIRECTORY);

        Self {
            root_directory: PathBuf::from(expand_placeholders(root, env)),
            retention_days: parse_setting(settings.get(DAYS_TO_KEEP), DEFAULT_DAYS_TO_KEEP, |_| true),
            interval_minutes: parse_setting(
                settings.get(CHECK_INTERVAL_MINUTES),
                DEFAULT_CHECK_INTERVAL_MINUTES,
                |minutes| (1..=MAX_CHECK_INTERVAL_MINUTES).contains(minutes),
            ),
            low_disk_threshold_mb: parse_setting(
                settings.get(LOW_DISK_THRESHOLD_MB),
                DEFAULT_LOW_DISK_THRESHOLD_MB,
                |_| true,
            ),
        }
    }

    /// Pass interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Retention window as Duration
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(86400))
    }

    /// Notices for every field that differs from `previous`
    pub fn changes_since(&self, previous: &Configuration) -> Vec<ChangeNotice> {
        let mut notices = Vec::new();

        if self.root_directory != previous.root_directory {
            notices.push(ChangeNotice::new(
                ROOT_LOG_SEARCH_DIRECTORY,
                previous.root_directory.display(),
                self.root_directory.display(),
            ));
        }
        if self.retention_days != previous.retention_days {
            notices.push(ChangeNotice::new(
                DAYS_TO_KEEP,
                previous.retention_days,
                self.retention_days,
            ));
        }
        if self.interval_minutes != previous.interval_minutes {
            notices.push(ChangeNotice::new(
                CHECK_INTERVAL_MINUTES,
                previous.interval_minutes,
                self.interval_minutes,
            ));
        }
        if self.low_disk_threshold_mb != previous.low_disk_threshold_mb {
            notices.push(ChangeNotice::new(
                LOW_DISK_THRESHOLD_MB,
                previous.low_disk_threshold_mb,
                self.low_disk_threshold_mb,
            ));
        }

        notices
    }
}

/// One configuration field whose resolved value changed across a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    /// Setting name (e.g. `DaysToKeep`)
    pub field: &'static str,
    /// Previous resolved value
    pub old: String,
    /// New resolved value
    pub new: String,
}

impl ChangeNotice {
    fn new(field: &'static str, old: impl fmt::Display, new: impl fmt::Display) -> Self {
        Self {
            field,
            old: old.to_string(),
            new: new.to_string(),
        }
    }
}

impl fmt::Display for ChangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} changed from {} to {}", self.field, self.old, self.new)
    }
}

/// Parse a raw setting, falling back to `default` on any problem
///
/// Missing, blank, unparseable and rejected (`valid` returns false) values
/// all produce the default. Nothing is reported.
///
/// ```
/// use logsweep_janitor::config::parse_setting;
///
/// assert_eq!(parse_setting(Some(" 30 "), 7u64, |_| true), 30);
/// assert_eq!(parse_setting(Some("-3"), 7u64, |_| true), 7);
/// assert_eq!(parse_setting(Some("0"), 15u64, |m| *m > 0), 15);
/// assert_eq!(parse_setting(None, 1000u64, |_| true), 1000);
/// ```
pub fn parse_setting<T, V>(raw: Option<&str>, default: T, valid: V) -> T
where
    T: FromStr,
    V: Fn(&T) -> bool,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<T>().ok())
        .filter(|value| valid(value))
        .unwrap_or(default)
}

/// Expand environment placeholders in a path
///
/// Handles Windows-style `%NAME%` as well as `$NAME` and `${NAME}`.
/// Placeholders that `env` cannot resolve are left as written. Each
/// placeholder in `raw` is expanded once: substituted values are inserted
/// verbatim and never scanned for further placeholders.
pub fn expand_placeholders<F>(raw: &str, mut env: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('%') {
        out.push_str(&expand_shell(&rest[..start], &mut env));
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match env(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                // lone or doubled '%': keep one and rescan from the next char
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(&expand_shell(rest, &mut env));
    out
}

fn expand_shell<F>(text: &str, env: &mut F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    shellexpand::env_with_context_no_errors(text, |name| env(name)).into_owned()
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Holds the current configuration and refreshes it from a settings source
///
/// The current snapshot is published through a `watch` channel, so readers
/// on other tasks always see a complete `Configuration`.
pub struct ConfigStore {
    source: Arc<dyn SettingsSource>,
    current: watch::Sender<Arc<Configuration>>,
}

impl ConfigStore {
    /// Create a store that starts from the built-in defaults
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        let (current, _) = watch::channel(Arc::new(Configuration::default()));
        Self { source, current }
    }

    /// The configuration produced by the latest refresh
    pub fn current(&self) -> Arc<Configuration> {
        self.current.borrow().clone()
    }

    /// Watch for newly published configurations
    pub fn subscribe(&self) -> watch::Receiver<Arc<Configuration>> {
        self.current.subscribe()
    }

    /// Re-read the settings source and publish a new configuration
    ///
    /// Never fails: an unreadable source means every field takes its
    /// default. Returns the new snapshot and one notice per changed field.
    pub fn refresh(&self) -> (Arc<Configuration>, Vec<ChangeNotice>) {
        let settings = match self.source.load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("Settings unavailable, using defaults: {}", e);
                Settings::new()
            }
        };

        let next = Arc::new(Configuration::from_settings(&settings, process_env));
        let previous = self.current.send_replace(next.clone());
        let changes = next.changes_since(&previous);

        (next, changes)
    }
}
