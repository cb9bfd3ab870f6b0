//! Logsweep Daemon
//!
//! Hosts the janitor service as a long-running process: reads the CLI,
//! sets up logging and maps host signals onto start/stop/pause/resume.

#![warn(missing_docs)]

pub mod cli;
pub mod error;
pub mod signals;

pub use cli::Cli;
pub use error::{DaemonError, Result};

use logsweep_janitor::{CleanupEngine, JanitorService, PassOutcome, TomlFileSource};
use signals::{HostSignal, HostSignals};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr
///
/// `RUST_LOG` wins over `default_filter` when it is set.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| DaemonError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| DaemonError::Logging(e.to_string()))
}

/// Run the daemon until the host asks it to stop
///
/// With `--once` a single pass runs and the function returns; an aborted
/// pass is reported as an error so the exit status reflects it.
pub async fn run(cli: Cli) -> Result<()> {
    info!("Starting logsweep (settings: {})", cli.config.display());

    let source = Arc::new(TomlFileSource::new(&cli.config));
    let mut engine = CleanupEngine::with_defaults(source);

    if cli.once {
        let report = engine.run_pass();
        info!("Pass finished: {}", report.summary());
        if report.outcome == PassOutcome::Aborted {
            return Err(DaemonError::PassAborted(report.summary()));
        }
        return Ok(());
    }

    let mut signals = HostSignals::install()?;
    let mut service = JanitorService::new(engine);
    service.start(cli.args).await?;

    loop {
        match signals.recv().await? {
            HostSignal::Stop => {
                info!("Shutdown signal received, stopping janitor");
                break;
            }
            HostSignal::Pause => {
                info!("Pausing janitor");
                service.pause().await?;
            }
            HostSignal::Resume => {
                info!("Resuming janitor");
                service.resume().await?;
            }
        }
    }

    service.stop().await?;
    Ok(())
}
