//! External settings sources
//!
//! A settings source is a reload-on-access key/value store. The config store
//! calls [`SettingsSource::load`] once per refresh and never caches the
//! result, so edits to the backing store show up on the next pass.

use crate::JanitorError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key for the directory to search for logs (may contain placeholders)
pub const ROOT_LOG_SEARCH_DIRECTORY: &str = "RootLogSearchDirectory";
/// Key for the number of days since last write a log is kept
pub const DAYS_TO_KEEP: &str = "DaysToKeep";
/// Key for the check interval in minutes
pub const CHECK_INTERVAL_MINUTES: &str = "CheckIntervalMinutes";
/// Key for the low-disk threshold in megabytes
pub const LOW_DISK_THRESHOLD_MB: &str = "LowDiskThresholdMB";

/// Raw settings as read from a source, keyed by setting name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Create an empty settings snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text of a setting, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a raw value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A key/value configuration store with reload-on-access semantics
pub trait SettingsSource: Send + Sync {
    /// Read the current settings
    ///
    /// An error here is not fatal: the config store falls back to defaults
    /// for every field.
    fn load(&self) -> Result<Settings, JanitorError>;
}

/// Settings read from a TOML file on every load
///
/// ```toml
/// RootLogSearchDirectory = "%SystemDrive%\\inetpub\\logs"
/// DaysToKeep = 7
/// CheckIntervalMinutes = "15"
/// LowDiskThresholdMB = 1000
/// ```
///
/// Values may be written as strings or integers. Anything else is carried
/// through as text and will fail to parse, which means the default applies.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
    path: PathBuf,
}

/// A single value as it appears in the file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Integer(i64),
    Text(String),
    Other(toml::Value),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Integer(n) => n.to_string(),
            RawValue::Text(s) => s,
            RawValue::Other(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(rename = "RootLogSearchDirectory")]
    root_log_search_directory: Option<RawValue>,

    #[serde(rename = "DaysToKeep")]
    days_to_keep: Option<RawValue>,

    #[serde(rename = "CheckIntervalMinutes")]
    check_interval_minutes: Option<RawValue>,

    #[serde(rename = "LowDiskThresholdMB")]
    low_disk_threshold_mb: Option<RawValue>,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        [
            (ROOT_LOG_SEARCH_DIRECTORY, raw.root_log_search_directory),
            (DAYS_TO_KEEP, raw.days_to_keep),
            (CHECK_INTERVAL_MINUTES, raw.check_interval_minutes),
            (LOW_DISK_THRESHOLD_MB, raw.low_disk_threshold_mb),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v.into_text())))
        .collect()
    }
}

impl TomlFileSource {
    /// Create a source backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Settings, JanitorError> {
        let raw: RawSettings = toml::from_str(contents)
            .map_err(|e| JanitorError::Settings(format!("Failed to parse settings TOML: {}", e)))?;
        Ok(raw.into())
    }
}

impl SettingsSource for TomlFileSource {
    fn load(&self) -> Result<Settings, JanitorError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| JanitorError::io(&self.path, e))?;
        Self::parse(&contents)
    }
}

/// In-memory settings that can be changed while the service runs
#[derive(Debug, Default)]
pub struct MemorySource {
    values: RwLock<Settings>,
}

impl MemorySource {
    /// Create an empty source (every field will use its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source pre-populated with the given pairs
    pub fn with_values<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            values: RwLock::new(pairs.into_iter().collect()),
        }
    }

    /// Set or replace a value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key, value);
    }

    /// Remove a value so the default applies again
    pub fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.values.remove(key);
    }
}

impl SettingsSource for MemorySource {
    fn load(&self) -> Result<Settings, JanitorError> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.clone())
    }
}
