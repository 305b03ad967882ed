//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use steward::component::{Component, ReportsHealth};
use steward::{Health, Settings};
use tokio_util::sync::CancellationToken;

/// Ordered record of lifecycle calls, shared by every recorder of a test.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Component that records its lifecycle calls and fails on request.
pub struct Recorder {
    name: &'static str,
    journal: Journal,
    fail_init: bool,
    fail_start: bool,
    fail_stop: bool,
    hang_stop: bool,
    stopped: CancellationToken,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: Arc::clone(journal),
            fail_init: false,
            fail_start: false,
            fail_stop: false,
            hang_stop: false,
            stopped: CancellationToken::new(),
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// `stop` never returns and ignores its token.
    pub fn hanging_stop(mut self) -> Self {
        self.hang_stop = true;
        self
    }

    fn record(&self, event: &str) {
        self.journal.lock().push(format!("{}:{}", self.name, event));
    }
}

#[async_trait]
impl Component for Recorder {
    async fn init(&mut self, _token: CancellationToken) -> anyhow::Result<()> {
        self.record("init");
        if self.fail_init {
            anyhow::bail!("{} cannot reach its dependency", self.name);
        }
        Ok(())
    }

    async fn start(&self, token: CancellationToken) -> anyhow::Result<()> {
        self.record("start");
        if self.fail_start {
            anyhow::bail!("{} failed to start", self.name);
        }
        tokio::select! {
            _ = token.cancelled() => {}
            _ = self.stopped.cancelled() => {}
        }
        Ok(())
    }

    async fn stop(&self, _token: CancellationToken) -> anyhow::Result<()> {
        self.record("stop");
        if self.hang_stop {
            std::future::pending::<()>().await;
        }
        self.stopped.cancel();
        if self.fail_stop {
            anyhow::bail!("{} failed to flush", self.name);
        }
        Ok(())
    }

    fn name(&self) -> Option<&str> {
        Some(self.name)
    }

    fn as_health_reporter(&self) -> Option<&dyn ReportsHealth> {
        Some(self)
    }
}

impl ReportsHealth for Recorder {
    fn healthcheck(&self) -> Health {
        Health::up()
    }
}

/// Entries of `journal` matching `event`, in order.
pub fn events(journal: &Journal, event: &str) -> Vec<String> {
    let suffix = format!(":{event}");
    journal
        .lock()
        .iter()
        .filter(|entry| entry.ends_with(&suffix))
        .cloned()
        .collect()
}

/// Settings for a supervisor listening on `127.0.0.1:port`.
pub fn settings(port: u16) -> Settings {
    let mut settings = Settings::default();
    settings.http.host = "127.0.0.1".into();
    settings.http.port = port;
    settings.shutdown.window_ms = 2_000;
    settings.shutdown.abandon_after_ms = 500;
    settings.version = Some("1.2.3".into());
    settings
}

pub fn url(port: u16, path: &str) -> String {
    format!("http://127.0.0.1:{port}/.well-known/health/{path}")
}

/// Poll the readiness route until it answers 200.
pub async fn wait_ready(port: u16) {
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(response) = client.get(url(port, "ready")).send().await {
            if response.status() == 200 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("supervisor on port {port} never became ready");
}
