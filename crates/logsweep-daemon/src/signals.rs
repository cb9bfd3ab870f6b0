//! Host lifecycle signals mapped onto service controls.
//!
//! Ctrl+C and SIGTERM stop the daemon. On Unix, SIGUSR1 pauses and SIGUSR2
//! resumes the periodic trigger.

use crate::error::{DaemonError, Result};

/// A lifecycle request from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// Stop the service and exit
    Stop,
    /// Disarm the trigger, keep the process alive
    Pause,
    /// Rearm the trigger from scratch
    Resume,
}

/// Installed signal handlers
pub struct HostSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    pause: tokio::signal::unix::Signal,
    #[cfg(unix)]
    resume: tokio::signal::unix::Signal,
}

impl HostSignals {
    /// Install handlers; must be called inside a tokio runtime
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate()).map_err(DaemonError::Signal)?,
            pause: signal(SignalKind::user_defined1()).map_err(DaemonError::Signal)?,
            resume: signal(SignalKind::user_defined2()).map_err(DaemonError::Signal)?,
        })
    }

    /// Install handlers; must be called inside a tokio runtime
    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next host request
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Result<HostSignal> {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(DaemonError::Signal)?;
                Ok(HostSignal::Stop)
            }
            _ = self.terminate.recv() => Ok(HostSignal::Stop),
            _ = self.pause.recv() => Ok(HostSignal::Pause),
            _ = self.resume.recv() => Ok(HostSignal::Resume),
        }
    }

    /// Wait for the next host request
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Result<HostSignal> {
        tokio::signal::ctrl_c().await.map_err(DaemonError::Signal)?;
        Ok(HostSignal::Stop)
    }
}
