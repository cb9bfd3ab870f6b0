//! Logsweep Janitor
//!
//! Background maintenance service that reclaims disk space by deleting stale
//! web-server log files under a configured root directory.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Live reconfiguration**: Re-reading its settings at the start of every pass
//! - **Retention cleanup**: Deleting `*.log` files not written to for `DaysToKeep` days
//! - **Low-disk relief**: Deleting oldest-accessed files first while free space is
//!   below `LowDiskThresholdMB`
//! - **Scheduling**: Running passes on a cadence that itself can change at runtime
//!
//! # Pass Order
//!
//! | Step | Action | On failure |
//! |------|--------|------------|
//! | 1 | Refresh configuration, announce changed fields | Defaults apply silently |
//! | 2 | Check the root directory exists | Warning, pass skipped |
//! | 3 | Enumerate `*.log` recursively, oldest access first | Error, pass aborted |
//! | 4 | Delete expired files, or any file while disk is low | Error per file, sweep continues |
//!
//! # Usage
//!
//! ## One-time Pass
//!
//! ```no_run
//! use logsweep_janitor::{CleanupEngine, TomlFileSource};
//! use std::sync::Arc;
//!
//! let mut engine = CleanupEngine::with_defaults(Arc::new(TomlFileSource::new("logsweep.toml")));
//! let report = engine.run_pass();
//! println!("{}", report.summary());
//! ```
//!
//! ## Background Service
//!
//! ```no_run
//! use logsweep_janitor::{CleanupEngine, JanitorService, TomlFileSource};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = CleanupEngine::with_defaults(Arc::new(TomlFileSource::new("logsweep.toml")));
//!     let mut service = JanitorService::new(engine);
//!
//!     service.start(Vec::new()).await?;
//!     tokio::signal::ctrl_c().await?;
//!     service.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Settings are read from a TOML file on every pass:
//!
//! ```toml
//! RootLogSearchDirectory = "%SystemDrive%\\inetpub\\logs"
//! DaysToKeep = 7
//! CheckIntervalMinutes = 15
//! LowDiskThresholdMB = 1000
//! ```
//!
//! Missing or malformed values fall back to the defaults shown above.

#![warn(missing_docs)]

mod error;
pub mod config;
pub mod settings;
pub mod fs;
pub mod sink;
mod metrics;
mod engine;
mod worker;

#[cfg(test)]
mod testing;

pub use error::JanitorError;
pub use config::{ChangeNotice, ConfigStore, Configuration};
pub use settings::{MemorySource, Settings, SettingsSource, TomlFileSource};
pub use fs::{Filesystem, LocalFilesystem, LogFileEntry};
pub use sink::{EventSink, MemorySink, Severity, TracingSink};
pub use metrics::{JanitorMetrics, PassOutcome, PassReport};
pub use engine::CleanupEngine;
pub use worker::{JanitorService, STARTED_MESSAGE, STOPPED_MESSAGE};
