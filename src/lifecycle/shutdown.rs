//! Shutdown coordination.
//!
//! # State Machine
//! ```text
//! Running ──(signal | root token cancelled)──▶ Draining ──(done | window elapsed)──▶ Stopped
//! ```
//!
//! On entering `Draining`: set the draining flag, open the shutdown window,
//! wait the readiness delay, stop the HTTP listener and let it drain, then
//! stop components. Everything after the flag flip, the readiness delay
//! included, is bounded by the window.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::component::Component;
use crate::config::ShutdownSettings;
use crate::error::{self, Error, Result};
use crate::http::ServerControl;
use crate::lifecycle::errors::{panic_message, ErrorSet};
use crate::lifecycle::orchestrator::stop_all;
use crate::lifecycle::signals::TerminationSignals;

/// Shared "process is shutting down" flag.
///
/// Written once (false → true), read by any task.
#[derive(Debug, Clone, Default)]
pub struct DrainFlag(Arc<AtomicBool>);

impl DrainFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag. Returns `true` only for the call that flipped it.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_draining(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining,
    Stopped,
}

/// Bounded-duration cancellation scope for the drain-then-stop sequence.
///
/// The token is cancelled when the deadline passes or the window is dropped.
#[derive(Debug)]
pub struct ShutdownWindow {
    bound: Duration,
    deadline: Instant,
    token: CancellationToken,
}

impl ShutdownWindow {
    /// Open a window closing `bound` from now. Must be called inside a runtime.
    pub fn open(bound: Duration) -> Self {
        let deadline = Instant::now() + bound;
        let token = CancellationToken::new();

        let timer = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => timer.cancel(),
                _ = timer.cancelled() => {}
            }
        });

        Self {
            bound,
            deadline,
            token,
        }
    }

    pub fn bound(&self) -> Duration {
        self.bound
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_elapsed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ShutdownWindow {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// What made the coordinator start draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Interrupt,
    Terminate,
    /// The root token was cancelled: programmatic shutdown or listener failure.
    Requested,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Interrupt => f.write_str("SIGINT"),
            Trigger::Terminate => f.write_str("SIGTERM"),
            Trigger::Requested => f.write_str("requested"),
        }
    }
}

/// Cloneable handle for observing or requesting shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    root: CancellationToken,
    draining: DrainFlag,
    state: watch::Receiver<ShutdownState>,
}

impl ShutdownHandle {
    /// Request shutdown, as if a termination signal had been received.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn is_draining(&self) -> bool {
        self.draining.is_draining()
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Wait until the coordinator reaches `state` (or a later one).
    pub async fn wait_for(&self, state: ShutdownState) {
        let mut rx = self.state.clone();
        let _ = rx.wait_for(|current| reached(*current, state)).await;
    }
}

fn reached(current: ShutdownState, wanted: ShutdownState) -> bool {
    use ShutdownState::*;
    matches!(
        (current, wanted),
        (_, Running) | (Draining | Stopped, Draining) | (Stopped, Stopped)
    )
}

/// Runs the drain-then-stop sequence once triggered.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    settings: ShutdownSettings,
    root: CancellationToken,
    draining: DrainFlag,
    state: watch::Sender<ShutdownState>,
}

impl ShutdownCoordinator {
    pub fn new(settings: ShutdownSettings, root: CancellationToken, draining: DrainFlag) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            settings,
            root,
            draining,
            state,
        }
    }

    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            root: self.root.clone(),
            draining: self.draining.clone(),
            state: self.state.subscribe(),
        }
    }

    /// Wait for a trigger, then drain the listener and stop components.
    ///
    /// Errors are pushed into `errors`; the state ends at `Stopped`.
    pub async fn run(
        self,
        signals: Option<TerminationSignals>,
        server: ServerControl,
        components: Arc<[Arc<dyn Component>]>,
        errors: ErrorSet,
    ) {
        let trigger = self.wait_for_trigger(signals).await;
        self.root.cancel();
        self.draining.set();
        self.state.send_replace(ShutdownState::Draining);
        tracing::info!(trigger = %trigger, "Received shut down signal, shutting down application");

        let window = ShutdownWindow::open(self.settings.window());

        // TODO: replace the fixed delay with confirmation that the readiness
        // probe has been observed as failing, once such a handshake exists.
        let delay = self.settings.readiness_delay();
        if !delay.is_zero() {
            tracing::info!(delay = ?delay, "Waiting for readiness to propagate");
            let until = (Instant::now() + delay).min(window.deadline());
            tokio::time::sleep_until(until).await;
        }

        if let Err(e) = shutdown(&window, server, components).await {
            tracing::error!(error = %e, "Shutdown");
            errors.push(e);
        }
        drop(window);

        self.state.send_replace(ShutdownState::Stopped);
        tracing::info!("Shutdown sequence finished");
    }

    async fn wait_for_trigger(&self, signals: Option<TerminationSignals>) -> Trigger {
        match signals {
            Some(mut signals) => tokio::select! {
                signal = signals.recv() => signal,
                _ = self.root.cancelled() => Trigger::Requested,
            },
            None => {
                self.root.cancelled().await;
                Trigger::Requested
            }
        }
    }
}

/// Services are shut down first so requests drain, then components stop.
///
/// Component stop runs on a detached task; when the window elapses first the
/// task is abandoned, not aborted.
async fn shutdown(
    window: &ShutdownWindow,
    server: ServerControl,
    components: Arc<[Arc<dyn Component>]>,
) -> Result<()> {
    let mut failures = Vec::new();

    server.shutdown();
    if tokio::time::timeout_at(window.deadline(), server.stopped())
        .await
        .is_err()
    {
        tracing::warn!("HTTP server did not drain within the shutdown window");
        failures.push(Error::HttpDrainTimeout);
    }

    let token = window.token();
    let stopping = tokio::spawn(async move { stop_all(&components, &token).await });
    match tokio::time::timeout_at(window.deadline(), stopping).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => failures.push(e),
        Ok(Err(e)) => {
            if e.is_panic() {
                failures.push(Error::Panicked {
                    task: "stop components".to_string(),
                    message: panic_message(e.into_panic()),
                });
            }
        }
        Err(_) => {
            tracing::warn!(
                window = ?window.bound(),
                "Abandoning components that did not stop within the shutdown window"
            );
            failures.push(Error::ShutdownTimeout(window.bound()));
        }
    }

    match error::join(failures) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
