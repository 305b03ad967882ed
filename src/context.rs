//! Process-wide context.
//!
//! Constructed once per run and shared by `Arc` with every task that needs
//! it. The draining flag is the only field mutated after start-up.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::lifecycle::DrainFlag;

#[derive(Debug)]
pub struct AppContext {
    settings: Settings,
    draining: DrainFlag,
    started_at: Instant,
    started_at_wall: DateTime<Utc>,
}

impl AppContext {
    /// Context for a run starting now.
    pub fn new(settings: Settings, draining: DrainFlag) -> Self {
        Self {
            settings,
            draining,
            started_at: Instant::now(),
            started_at_wall: Utc::now(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn draining(&self) -> &DrainFlag {
        &self.draining
    }

    pub fn is_draining(&self) -> bool {
        self.draining.is_draining()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at_wall
    }
}
