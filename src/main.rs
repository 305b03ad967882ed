//! steward: process supervisor for long-running network services.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     SUPERVISOR                       │
//!                 │                                                      │
//!   SIGTERM ──────┼─▶ ┌───────────┐  drain   ┌──────────────────────┐    │
//!   SIGINT        │   │ shutdown  │─────────▶│ http (health routes) │    │
//!                 │   │coordinator│          └──────────────────────┘    │
//!                 │   └─────┬─────┘                                      │
//!                 │         │ stop (in order)                            │
//!                 │         ▼                                            │
//!                 │   ┌───────────┐ ┌───────────┐ ┌───────────┐          │
//!                 │   │component 1│ │component 2│ │component n│          │
//!                 │   └───────────┘ └───────────┘ └───────────┘          │
//!                 │                                                      │
//!                 │   config · logging · error aggregation · exit codes  │
//!                 └──────────────────────────────────────────────────────┘
//! ```
//!
//! The binary runs a heartbeat component under the supervisor, which is
//! enough to exercise the health routes and the shutdown sequence.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use steward::component::{Component, ReportsHealth, UsesLogger};
use steward::config::{load_settings, Settings};
use steward::health::Health;
use steward::supervisor::SupervisorBuilder;

#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "Supervise components behind a health-checked HTTP listener", long_about = None)]
struct Cli {
    /// TOML settings file. Environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for the health listener.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,

    /// Seconds between heartbeats.
    #[arg(long, default_value_t = 5)]
    interval: u64,
}

/// Logs a heartbeat at a fixed interval until stopped.
struct Heartbeat {
    interval: Duration,
    beats: AtomicU64,
    span: tracing::Span,
    stopped: CancellationToken,
}

impl Heartbeat {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            beats: AtomicU64::new(0),
            span: tracing::Span::none(),
            stopped: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl Component for Heartbeat {
    async fn init(&mut self, _token: CancellationToken) -> anyhow::Result<()> {
        anyhow::ensure!(!self.interval.is_zero(), "heartbeat interval must be non-zero");
        Ok(())
    }

    async fn start(&self, token: CancellationToken) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        async {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let beat = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::info!(beat, "Heartbeat");
                    }
                    _ = token.cancelled() => break,
                    _ = self.stopped.cancelled() => break,
                }
            }
        }
        .instrument(self.span.clone())
        .await;
        Ok(())
    }

    async fn stop(&self, _token: CancellationToken) -> anyhow::Result<()> {
        self.stopped.cancel();
        Ok(())
    }

    fn name(&self) -> Option<&str> {
        Some("heartbeat")
    }

    fn as_logger_user(&mut self) -> Option<&mut dyn UsesLogger> {
        Some(self)
    }

    fn as_health_reporter(&self) -> Option<&dyn ReportsHealth> {
        Some(self)
    }
}

impl UsesLogger for Heartbeat {
    fn use_logger(&mut self, span: tracing::Span) {
        self.span = span;
    }
}

impl ReportsHealth for Heartbeat {
    fn healthcheck(&self) -> Health {
        Health::up().with_detail("beats", self.beats.load(Ordering::Relaxed))
    }
}

fn settings(cli: &Cli) -> steward::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::from_env()?,
    };
    if let Some(port) = cli.port {
        settings.http.port = port;
    }
    if cli.debug {
        settings.logging.debug = true;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("steward: {e}");
            return ExitCode::FAILURE;
        }
    };

    let supervisor = match SupervisorBuilder::new(settings)
        .with_component(Heartbeat::new(Duration::from_secs(cli.interval)))
        .build()
    {
        Ok(supervisor) => supervisor,
        Err(e) => {
            eprintln!("steward: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "steward starting");
    let outcome = supervisor.run().await;
    tracing::info!(code = outcome.code(), "steward exiting");
    outcome.exit_code()
}
