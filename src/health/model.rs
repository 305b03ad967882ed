//! Health report model.
//!
//! Only `status` is mandatory; empty fields are left out of the JSON body.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall health of the process or of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Up,
    Down,
    Degraded,
}

impl HealthStatus {
    /// Whether this status should degrade an aggregate report.
    pub fn is_impaired(self) -> bool {
        matches!(self, HealthStatus::Down | HealthStatus::Degraded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Ok => "OK",
            HealthStatus::Up => "UP",
            HealthStatus::Down => "DOWN",
            HealthStatus::Degraded => "DEGRADED",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: HealthStatus,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uptime: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub uptime_sec: u64,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "HealthMeta::is_empty")]
    pub meta: HealthMeta,
}

impl Health {
    pub fn new(status: HealthStatus) -> Self {
        Self {
            status,
            uptime: String::new(),
            uptime_sec: 0,
            details: BTreeMap::new(),
            meta: HealthMeta::default(),
        }
    }

    pub fn up() -> Self {
        Self::new(HealthStatus::Up)
    }

    pub fn down() -> Self {
        Self::new(HealthStatus::Down)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_default();
        self.details.insert(key.into(), value);
        self
    }

    /// Set uptime, rounded to whole seconds.
    pub fn with_uptime(mut self, uptime: Duration) -> Self {
        let rounded = round_to_secs(uptime);
        self.uptime = format_uptime(rounded);
        self.uptime_sec = rounded.as_secs();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_unix_ms: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_unix_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl HealthMeta {
    /// Meta stamped with `now`, truncated to milliseconds.
    pub fn at(now: DateTime<Utc>, version: Option<String>) -> Self {
        let millis = now.timestamp_millis();
        Self {
            timestamp: DateTime::from_timestamp_millis(millis),
            timestamp_unix_ms: Some(millis),
            timestamp_unix_sec: Some(now.timestamp()),
            version,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &HealthMeta::default()
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn round_to_secs(duration: Duration) -> Duration {
    let secs = duration.as_secs();
    if duration.subsec_millis() >= 500 {
        Duration::from_secs(secs + 1)
    } else {
        Duration::from_secs(secs)
    }
}

/// Render whole seconds as `1h2m3s`, `4m5s` or `6s`.
pub fn format_uptime(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::ZERO), "0s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "59s");
        assert_eq!(format_uptime(Duration::from_secs(61)), "1m1s");
        assert_eq!(format_uptime(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_uptime(Duration::from_secs(3723)), "1h2m3s");
    }

    #[test]
    fn uptime_rounds_to_nearest_second() {
        let health = Health::up().with_uptime(Duration::from_millis(2_600));
        assert_eq!(health.uptime, "3s");
        assert_eq!(health.uptime_sec, 3);
    }

    #[test]
    fn minimal_health_serializes_status_only() {
        let json = serde_json::to_value(Health::up()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "UP" }));
    }

    #[test]
    fn meta_is_truncated_to_millis() {
        let now = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let meta = HealthMeta::at(now, Some("1.0.0".into()));
        assert_eq!(meta.timestamp_unix_ms, Some(1_700_000_000_123));
        assert_eq!(meta.timestamp_unix_sec, Some(1_700_000_000));
        assert_eq!(meta.timestamp.unwrap().timestamp_subsec_nanos(), 123_000_000);

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["version"], "1.0.0");
    }

    #[test]
    fn impaired_statuses() {
        assert!(HealthStatus::Down.is_impaired());
        assert!(HealthStatus::Degraded.is_impaired());
        assert!(!HealthStatus::Up.is_impaired());
        assert!(!HealthStatus::Ok.is_impaired());
    }
}
