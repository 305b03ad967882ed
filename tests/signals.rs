//! Termination signal handling. Kept in its own test binary: the signal is
//! delivered to the whole process.

#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use steward::{ShutdownState, SupervisorBuilder};

mod common;
use common::{events, settings, url, wait_ready, Journal, Recorder};

#[tokio::test]
async fn sigterm_drains_and_stops_in_order() {
    let journal = Journal::default();
    let mut settings = settings(28501);
    settings.shutdown.readiness_delay_ms = 500;
    let supervisor = SupervisorBuilder::new(settings)
        .with_component(Recorder::new("alpha", &journal))
        .with_component(Recorder::new("beta", &journal))
        .build()
        .unwrap();
    let handle = supervisor.shutdown_handle();
    let run = tokio::spawn(supervisor.run());

    wait_ready(28501).await;
    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    tokio::time::timeout(Duration::from_secs(5), handle.wait_for(ShutdownState::Draining))
        .await
        .expect("signal triggers draining");
    let ready = reqwest::get(url(28501, "ready")).await.unwrap();
    assert_eq!(ready.status(), 503);

    let outcome = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run ends")
        .unwrap();
    assert!(outcome.is_clean(), "{outcome:?}");
    assert_eq!(events(&journal, "stop"), vec!["alpha:stop", "beta:stop"]);
    assert!(reqwest::get(url(28501, "ready")).await.is_err());
}
