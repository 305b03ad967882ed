//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Install a caller-provided log sink instead, when given one
//! - Build the per-component spans that carry diagnostic context
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, human format for development
//! - Log level configurable via settings and `RUST_LOG`
//! - Installing a subscriber twice is not an error (tests, embedders)

use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSettings;

/// Install the default subscriber for the given settings.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(settings).into());
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if settings.is_development() {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(env = %settings.env, debug = settings.debug, "Logging configured");
    }
    installed
}

/// Install a pre-built dispatcher as the global default.
///
/// Returns `false` if a global subscriber was already installed.
pub fn install(dispatch: Dispatch) -> bool {
    tracing::dispatcher::set_global_default(dispatch).is_ok()
}

fn default_directives(settings: &LoggingSettings) -> &'static str {
    if settings.debug {
        "debug,hyper=info"
    } else {
        "info"
    }
}

/// Span carrying a component's diagnostic context.
///
/// Every lifecycle call of a component runs inside one, so records emitted by
/// the component itself are attributed to it.
pub fn component_span(name: Option<&str>, type_name: &str) -> tracing::Span {
    match name {
        Some(name) => tracing::info_span!("component", name = %name, component_type = %type_name),
        None => tracing::info_span!("component", component_type = %type_name),
    }
}
