//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the supervisor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root settings for a supervised process.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings.
    pub http: HttpSettings,

    /// Shutdown sequence settings.
    pub shutdown: ShutdownSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Application version reported by the status endpoint.
    pub version: Option<String>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpSettings {
    /// Host to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            request_timeout_secs: 60,
        }
    }
}

impl HttpSettings {
    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Shutdown sequence settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownSettings {
    /// Bound of the shutdown window in milliseconds. Must be non-zero.
    pub window_ms: u64,

    /// Delay between flipping the draining flag and stopping the listener,
    /// giving load balancers time to observe readiness going down.
    pub readiness_delay_ms: u64,

    /// How long to wait for tasks to exit once shutdown has completed before
    /// abandoning them.
    pub abandon_after_ms: u64,
}

impl Default for ShutdownSettings {
    fn default() -> Self {
        Self {
            window_ms: 15_000,
            readiness_delay_ms: 0,
            abandon_after_ms: 5_000,
        }
    }
}

impl ShutdownSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn readiness_delay(&self) -> Duration {
        Duration::from_millis(self.readiness_delay_ms)
    }

    pub fn abandon_after(&self) -> Duration {
        Duration::from_millis(self.abandon_after_ms)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Deployment environment. `development`/`dev` selects pretty output,
    /// anything else JSON.
    pub env: String,

    /// Raise the default filter to debug.
    pub debug: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            env: "development".to_string(),
            debug: false,
        }
    }
}

impl LoggingSettings {
    pub fn is_development(&self) -> bool {
        matches!(self.env.as_str(), "development" | "dev")
    }
}
