//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the supervisor

use std::fmt;

use crate::config::schema::Settings;

/// A single semantic problem with a settings value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate settings, collecting every problem found.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.http.host.trim().is_empty() {
        errors.push(ValidationError::new("http.host", "must not be empty"));
    }
    if settings.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "http.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    // The shutdown window must always have a finite, non-zero deadline.
    if settings.shutdown.window_ms == 0 {
        errors.push(ValidationError::new(
            "shutdown.window_ms",
            "must be greater than 0",
        ));
    }
    if settings.logging.env.trim().is_empty() {
        errors.push(ValidationError::new("logging.env", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut settings = Settings::default();
        settings.shutdown.window_ms = 0;
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "shutdown.window_ms");
    }

    #[test]
    fn reports_every_problem() {
        let mut settings = Settings::default();
        settings.shutdown.window_ms = 0;
        settings.http.host = " ".into();
        settings.http.request_timeout_secs = 0;
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
