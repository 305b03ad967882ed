//! Component lifecycle orchestration.
//!
//! # Responsibilities
//! - Inject capabilities and run `init` in registration order
//! - Dispatch `start` of every component as its own tracked task
//! - Run `stop` in registration order, one at a time
//!
//! # Design Decisions
//! - No short-circuiting: one failing component never hides its siblings
//! - Start is concurrent for latency, stop is sequential for predictable
//!   diagnostics; insertion order is used for both
//! - Start errors are logged, init and stop errors are aggregated

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::component::{describe, Component, ComponentRegistry, Resources};
use crate::error::{Error, Result};
use crate::lifecycle::errors::{panic_message, ErrorSet};
use crate::observability::logging::component_span;
use crate::observability::Tracer;

/// Dependencies offered to components that declare the matching capability.
#[derive(Debug, Clone)]
pub struct Injections {
    pub tracer: Tracer,
    pub resources: Resources,
}

/// Initialise every component, in registration order.
///
/// Capabilities are injected right before each component's own `init`.
/// Every failure is collected; the aggregate is returned at the end.
pub async fn init_all(
    registry: &mut ComponentRegistry,
    injections: &Injections,
    token: &CancellationToken,
) -> Result<()> {
    let errors = ErrorSet::new();

    for component in registry.iter_mut() {
        let label = describe(component.as_ref());
        let span = component_span(component.name(), component.type_name());

        inject(component.as_mut(), &span, injections);

        tracing::debug!(parent: &span, "Initialising component");
        if let Err(source) = component
            .init(token.clone())
            .instrument(span.clone())
            .await
        {
            tracing::error!(parent: &span, error = %source, "Initialising component failed");
            errors.push(Error::ComponentInit {
                component: label,
                source,
            });
        }
    }

    errors.into_result()
}

fn inject(component: &mut dyn Component, span: &tracing::Span, injections: &Injections) {
    if let Some(user) = component.as_logger_user() {
        user.use_logger(span.clone());
    }
    if let Some(user) = component.as_tracer_user() {
        user.use_tracer(injections.tracer.clone());
    }
    if let Some(user) = component.as_resource_user() {
        user.use_resources(&injections.resources);
    }
}

/// Start every component on its own task and return immediately.
///
/// Each task gets a child of `token`. A failing `start` is logged and only
/// ends that component's task.
pub fn start_all(
    components: &[Arc<dyn Component>],
    token: &CancellationToken,
    tracker: &TaskTracker,
    errors: &ErrorSet,
) {
    for component in components {
        let label = describe(component.as_ref());
        let span = component_span(component.name(), component.type_name());
        tracing::info!(parent: &span, "Starting");

        let component = Arc::clone(component);
        let token = token.child_token();
        let task = async move {
            match component.start(token).await {
                Ok(()) => tracing::debug!("Component exited"),
                Err(e) => tracing::warn!(error = %e, "Starting component failed"),
            }
        }
        .instrument(span);

        spawn_supervised(tracker, label, errors.clone(), task);
    }
}

/// Stop every component, in registration order, one at a time.
///
/// Every component is stopped exactly once, even after earlier failures.
pub async fn stop_all(components: &[Arc<dyn Component>], token: &CancellationToken) -> Result<()> {
    tracing::info!(count = components.len(), "Stopping components");
    let errors = ErrorSet::new();

    for component in components {
        let label = describe(component.as_ref());
        let span = component_span(component.name(), component.type_name());

        tracing::info!(parent: &span, "Stopping component");
        if let Err(source) = component
            .stop(token.clone())
            .instrument(span.clone())
            .await
        {
            tracing::warn!(parent: &span, error = %source, "Stopping component failed");
            errors.push(Error::ComponentStop {
                component: label,
                source,
            });
        }
    }

    errors.into_result()
}

/// Spawn `fut` as one unit of tracked work, recording a panic as an error.
pub(crate) fn spawn_supervised<F>(tracker: &TaskTracker, task: String, errors: ErrorSet, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let inner = tokio::spawn(fut);
    tracker.spawn(async move {
        if let Err(e) = inner.await {
            if e.is_panic() {
                let message = panic_message(e.into_panic());
                tracing::error!(task = %task, panic = %message, "Task panicked");
                errors.push(Error::Panicked { task, message });
            }
        }
    });
}
