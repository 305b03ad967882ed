//! Settings loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::Settings;
use crate::config::validation::validate_settings;
use crate::error::{Error, Result};

/// Load and validate settings from a TOML file.
///
/// Environment overrides are applied on top of the file contents.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(Error::ConfigIo)?;
    let mut settings: Settings = toml::from_str(&content)?;

    apply_env(&mut settings, |key| std::env::var(key).ok());
    validate_settings(&settings).map_err(Error::Config)?;

    Ok(settings)
}

impl Settings {
    /// Build settings from defaults and environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from defaults and an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        apply_env(&mut settings, lookup);
        validate_settings(&settings).map_err(Error::Config)?;
        Ok(settings)
    }
}

/// Apply environment overrides.
///
/// Unparseable values keep the current setting.
pub fn apply_env<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("HTTP_PORT").map(|v| v.trim().parse::<u16>()) {
        Some(Ok(port)) => settings.http.port = port,
        Some(Err(e)) => {
            tracing::debug!(error = %e, port = settings.http.port, "Invalid HTTP_PORT, keeping port");
        }
        None => {}
    }

    if let Some(env) = lookup("ENV").filter(|v| !v.trim().is_empty()) {
        settings.logging.env = env;
    }

    if let Some(debug) = lookup("STEWARD_DEBUG") {
        settings.logging.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes");
    }

    if let Some(Ok(secs)) = lookup("STEWARD_SHUTDOWN_SECS").map(|v| v.trim().parse::<u64>()) {
        settings.shutdown.window_ms = secs.saturating_mul(1_000);
    }

    if let Some(Ok(ms)) = lookup("STEWARD_READINESS_DELAY_MS").map(|v| v.trim().parse::<u64>()) {
        settings.shutdown.readiness_delay_ms = ms;
    }

    if let Some(version) = lookup("STEWARD_VERSION").filter(|v| !v.is_empty()) {
        settings.version = Some(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.http.port, 80);
        assert_eq!(settings.shutdown.window_ms, 15_000);
        assert!(settings.logging.is_development());
    }

    #[test]
    fn port_from_environment() {
        let settings = Settings::from_lookup(lookup(&[("HTTP_PORT", "8080")])).unwrap();
        assert_eq!(settings.http.port, 8080);
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let settings = Settings::from_lookup(lookup(&[("HTTP_PORT", "eighty")])).unwrap();
        assert_eq!(settings.http.port, 80);
    }

    #[test]
    fn zero_shutdown_window_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("STEWARD_SHUTDOWN_SECS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn production_env_and_debug() {
        let settings = Settings::from_lookup(lookup(&[
            ("ENV", "production"),
            ("STEWARD_DEBUG", "true"),
        ]))
        .unwrap();
        assert!(!settings.logging.is_development());
        assert!(settings.logging.debug);
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
version = "1.2.3"

[http]
port = 9090

[shutdown]
window_ms = 2000
"#
        )
        .unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.http.port, 9090);
        assert_eq!(settings.http.host, "0.0.0.0");
        assert_eq!(settings.shutdown.window_ms, 2000);
        assert_eq!(settings.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http\nport = ").unwrap();
        let err = load_settings(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(&dir.path().join("steward.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigIo(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
