//! Supervisor error taxonomy.
//!
//! # Categories
//! - Start-up: `Config`, `PortUnavailable`, `ComponentInit` (fatal, abort before any task runs)
//! - Shutdown: `ComponentStop`, `HttpDrainTimeout`, `ShutdownTimeout` (aggregated, never fatal alone)
//! - Runtime: `HttpServe`, `Signal` (aggregated, surfaced at the end of the run)
//! - Faults: `Panicked` (aggregated, turns the run outcome into a fault)
//!
//! Errors from independent sources are merged into [`Error::Multiple`].

use std::fmt;
use std::time::Duration;

use crate::config::validation::ValidationError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while supervising a process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {}", join_validation(.0))]
    Config(Vec<ValidationError>),

    #[error("reading configuration: {0}")]
    ConfigIo(#[source] std::io::Error),

    #[error("parsing configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("port {port} unavailable: {source}")]
    PortUnavailable {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("initialising component {component}: {source:#}")]
    ComponentInit {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("stopping component {component}: {source:#}")]
    ComponentStop {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("HTTP server stopped with unexpected error: {0}")]
    HttpServe(#[source] std::io::Error),

    #[error("HTTP server did not drain within the shutdown window")]
    HttpDrainTimeout,

    #[error("shutdown window of {0:?} elapsed before all components stopped")]
    ShutdownTimeout(Duration),

    #[error("installing signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error("task {task} panicked: {message}")]
    Panicked { task: String, message: String },

    #[error("{0}")]
    Multiple(Errors),
}

impl Error {
    /// True when this error, or any error it aggregates, matches `predicate`.
    pub fn any(&self, predicate: &dyn Fn(&Error) -> bool) -> bool {
        match self {
            Error::Multiple(errors) => errors.iter().any(|e| e.any(predicate)),
            other => predicate(other),
        }
    }

    /// Combine with an error from an independent source.
    pub fn and(self, other: Error) -> Error {
        let mut errors = match self {
            Error::Multiple(errors) => errors.into_inner(),
            single => vec![single],
        };
        errors.push(other);
        Error::Multiple(Errors(errors))
    }

    /// Flattened view of the leaf errors.
    pub fn leaves(&self) -> Vec<&Error> {
        match self {
            Error::Multiple(errors) => errors.iter().flat_map(|e| e.leaves()).collect(),
            other => vec![other],
        }
    }
}

/// A non-empty list of errors rendered one per line.
#[derive(Debug)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Error> {
        self.0
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Merge errors from independent sources.
///
/// Returns `None` for an empty input and the error itself for a single one.
pub fn join(errors: impl IntoIterator<Item = Error>) -> Option<Error> {
    let mut errors: Vec<Error> = errors.into_iter().collect();
    match errors.len() {
        0 => None,
        1 => errors.pop(),
        _ => Some(Error::Multiple(Errors(errors))),
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
