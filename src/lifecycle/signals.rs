//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM and SIGINT handlers before any work is spawned
//! - Translate the first delivered signal into a shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are installed synchronously so a signal arriving during start-up
//!   is queued rather than lost
//! - Non-unix targets only observe Ctrl-C

use std::io;

use crate::lifecycle::shutdown::Trigger;

/// Installed termination signal handlers.
#[derive(Debug)]
pub struct TerminationSignals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    /// Register handlers. Must be called inside a runtime.
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                terminate: signal(SignalKind::terminate())?,
                interrupt: signal(SignalKind::interrupt())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the next termination signal.
    pub async fn recv(&mut self) -> Trigger {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.terminate.recv() => Trigger::Terminate,
                _ = self.interrupt.recv() => Trigger::Interrupt,
            }
        }
        #[cfg(not(unix))]
        {
            match tokio::signal::ctrl_c().await {
                Ok(()) => Trigger::Interrupt,
                Err(e) => {
                    tracing::warn!(error = %e, "Ctrl-C handler failed");
                    std::future::pending().await
                }
            }
        }
    }
}

