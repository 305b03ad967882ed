//! Tracer handed to components that ask for one.
//!
//! # Responsibilities
//! - Create operation spans tagged with the service name
//! - Bind futures to the tracer's dispatcher
//!
//! # Design Decisions
//! - Backed by a `tracing::Dispatch`; exporters (OpenTelemetry, etc.) are
//!   plugged in as subscriber layers by the application, not here
//! - Cheap to clone

use std::future::Future;
use std::sync::Arc;

use tracing::instrument::{Instrumented, WithDispatch};
use tracing::{Dispatch, Instrument, Span};

/// Creates spans for a named service.
#[derive(Clone, Debug)]
pub struct Tracer {
    service: Arc<str>,
    dispatch: Dispatch,
}

impl Tracer {
    /// Tracer bound to the dispatcher current at the call site.
    pub fn new(service: impl Into<String>) -> Self {
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());
        Self::with_dispatch(service, dispatch)
    }

    /// Tracer bound to an explicit dispatcher.
    pub fn with_dispatch(service: impl Into<String>, dispatch: Dispatch) -> Self {
        let service: String = service.into();
        Self {
            service: Arc::from(service),
            dispatch,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Start a span for one operation.
    pub fn span(&self, operation: &str) -> Span {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::info_span!("operation", service = %self.service, operation = %operation)
        })
    }

    /// Run `fut` inside an operation span on this tracer's dispatcher.
    pub fn in_span<F>(&self, operation: &str, fut: F) -> WithDispatch<Instrumented<F>>
    where
        F: Future,
    {
        use tracing::instrument::WithSubscriber;
        fut.instrument(self.span(operation))
            .with_subscriber(self.dispatch.clone())
    }
}
