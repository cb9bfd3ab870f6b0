//! Operator-facing event log
//!
//! The engine reports what it did through an [`EventSink`]. In production
//! that is [`TracingSink`]; tests use [`MemorySink`] to inspect the entries.

use std::fmt;
use std::sync::Mutex;

/// Event source name attached to every entry
pub const EVENT_SOURCE: &str = "LogSweep";

/// Severity of an event log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Normal operation
    Information,
    /// Something is off but nothing failed
    Warning,
    /// An operation failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Information => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Append-only destination for event log entries
pub trait EventSink: Send + Sync {
    /// Write one entry
    fn write_entry(&self, message: &str, severity: Severity);
}

/// Forwards entries to `tracing` at the matching level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn write_entry(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Information => tracing::info!(event_source = EVENT_SOURCE, "{}", message),
            Severity::Warning => tracing::warn!(event_source = EVENT_SOURCE, "{}", message),
            Severity::Error => tracing::error!(event_source = EVENT_SOURCE, "{}", message),
        }
    }
}

/// Keeps every entry in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries written so far, oldest first
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages written at the given severity
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }

    /// Drop all recorded entries
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl EventSink for MemorySink {
    fn write_entry(&self, message: &str, severity: Severity) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_filters_by_severity() {
        let sink = MemorySink::new();
        sink.write_entry("cleaning /logs", Severity::Information);
        sink.write_entry("/gone not exists, nothing to do", Severity::Warning);
        sink.write_entry("Error deleting log file", Severity::Error);

        assert_eq!(sink.entries().len(), 3);
        assert_eq!(sink.messages(Severity::Warning), vec!["/gone not exists, nothing to do"]);

        sink.clear();
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Information.to_string(), "Information");
        assert_eq!(Severity::Error.to_string(), "Error");
    }
}
