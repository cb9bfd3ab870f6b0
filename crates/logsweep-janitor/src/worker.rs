//! Scheduled service around the cleanup engine
//!
//! [`JanitorService`] is what a host drives: `start` runs a pass right away
//! and arms a periodic trigger, `stop` disarms it. `pause` and `resume` are
//! plain aliases for `stop` and `start`.

use crate::config::MAX_CHECK_INTERVAL_MINUTES;
use crate::metrics::{JanitorMetrics, PassReport};
use crate::sink::Severity;
use crate::{CleanupEngine, JanitorError};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

/// Message written when the service starts
pub const STARTED_MESSAGE: &str = "Log Sweep Started";

/// Message written when the service stops
pub const STOPPED_MESSAGE: &str = "Log Sweep Stopped";

const MAX_PERIOD: Duration = Duration::from_secs(MAX_CHECK_INTERVAL_MINUTES * 60);

struct Trigger {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodic trigger and lifecycle state for a [`CleanupEngine`]
///
/// The engine sits behind an async mutex, so a tick can never start a pass
/// while another one (periodic or [`run_once`](Self::run_once)) is running.
///
/// # Examples
///
/// ```no_run
/// use logsweep_janitor::{CleanupEngine, JanitorService, TomlFileSource};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = CleanupEngine::with_defaults(Arc::new(TomlFileSource::new("logsweep.toml")));
///     let mut service = JanitorService::new(engine);
///
///     service.start(Vec::new()).await?;
///     tokio::signal::ctrl_c().await?;
///     service.stop().await?;
///     Ok(())
/// }
/// ```
pub struct JanitorService {
    engine: Arc<Mutex<CleanupEngine>>,
    trigger: Option<Trigger>,
    args: Vec<String>,
}

impl JanitorService {
    /// Wrap an engine; the service starts out stopped
    pub fn new(engine: CleanupEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            trigger: None,
            args: Vec::new(),
        }
    }

    /// Whether the periodic trigger is armed
    pub fn is_running(&self) -> bool {
        self.trigger.is_some()
    }

    /// Arguments given to the latest `start`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shared handle to the engine
    pub fn engine(&self) -> Arc<Mutex<CleanupEngine>> {
        self.engine.clone()
    }

    /// Snapshot of the engine's metrics
    pub async fn metrics(&self) -> JanitorMetrics {
        self.engine.lock().await.metrics().clone()
    }

    /// Run a single pass now, outside the schedule
    pub async fn run_once(&self) -> PassReport {
        self.engine.lock().await.run_pass()
    }

    /// Run one pass immediately, then arm the periodic trigger
    ///
    /// The first periodic pass fires one full interval after this call.
    /// Starting a running service does nothing.
    pub async fn start(&mut self, args: Vec<String>) -> Result<(), JanitorError> {
        if self.is_running() {
            return Ok(());
        }
        self.args = args;

        let period = {
            let mut engine = self.engine.lock().await;
            engine.run_pass();
            engine
                .sink()
                .write_entry(STARTED_MESSAGE, Severity::Information);
            engine.config().interval()
        };

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_trigger(self.engine.clone(), period, shutdown_rx));
        self.trigger = Some(Trigger { shutdown, handle });

        tracing::info!("Janitor worker started (interval: {:?})", period);
        Ok(())
    }

    /// Disarm the trigger
    ///
    /// A pass that is already running finishes first. Stopping a stopped
    /// service does nothing. If the trigger task died, the stop entry is
    /// still written and the failure is returned as [`JanitorError::Worker`].
    pub async fn stop(&mut self) -> Result<(), JanitorError> {
        let Some(trigger) = self.trigger.take() else {
            return Ok(());
        };

        // the receiver is gone only if the trigger task already exited
        let _ = trigger.shutdown.send(());
        let joined = trigger.handle.await;

        let engine = self.engine.lock().await;
        engine
            .sink()
            .write_entry(STOPPED_MESSAGE, Severity::Information);

        match joined {
            Ok(()) => {
                tracing::info!("Janitor stopped. Final metrics:\n{}", engine.metrics().summary());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Janitor trigger task failed: {}", e);
                Err(JanitorError::Worker(e.to_string()))
            }
        }
    }

    /// Same as [`stop`](Self::stop)
    pub async fn pause(&mut self) -> Result<(), JanitorError> {
        self.stop().await
    }

    /// Same as [`start`](Self::start) with the previous arguments,
    /// including the immediate pass
    pub async fn resume(&mut self) -> Result<(), JanitorError> {
        let args = self.args.clone();
        self.start(args).await
    }
}

impl Drop for JanitorService {
    fn drop(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            trigger.handle.abort();
        }
    }
}

fn schedule(period: Duration) -> Interval {
    let period = period.min(MAX_PERIOD);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_trigger(
    engine: Arc<Mutex<CleanupEngine>>,
    mut period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = schedule(period);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                tracing::debug!("Starting cleanup pass");

                let next = {
                    let mut engine = engine.lock().await;
                    let report = engine.run_pass();
                    // a run_once pass may have consumed the change already
                    report
                        .interval_changed
                        .unwrap_or_else(|| engine.config().interval())
                };

                if next != period {
                    tracing::info!("Rescheduling passes: {:?} -> {:?}", period, next);
                    period = next;
                    ticker = schedule(period);
                }
            }
        }
    }
}
