//! Component contract.
//!
//! # Lifecycle
//! ```text
//! register → [inject capabilities] → init → start ─┐
//!                                                  │ (runs until stop or failure)
//!                                    stop ─────────┘
//! ```
//!
//! # Design Decisions
//! - `init` takes `&mut self`: it runs strictly sequentially, before the
//!   component is shared with any task
//! - `start` and `stop` take `&self`: `stop` is how a running `start` is asked
//!   to return, so both run at the same time on the same component
//! - Optional capabilities are declared through query methods returning
//!   `Option<&dyn Trait>`; a component opts in by returning `Some(self)`
//! - Tokens bound waits; the supervisor never force-kills a component that
//!   ignores them

pub mod registry;
pub mod resources;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::health::Health;
use crate::observability::Tracer;

pub use registry::ComponentRegistry;
pub use resources::Resources;

/// A unit of work managed by the supervisor.
///
/// Implement [`Component::name`] for more context in logs.
///
/// ```
/// use steward::component::{Component, UsesLogger};
/// use tokio_util::sync::CancellationToken;
///
/// struct Worker {
///     log: tracing::Span,
///     stopped: CancellationToken,
/// }
///
/// #[async_trait::async_trait]
/// impl Component for Worker {
///     async fn init(&mut self, _token: CancellationToken) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     async fn start(&self, token: CancellationToken) -> anyhow::Result<()> {
///         tokio::select! {
///             _ = token.cancelled() => {}
///             _ = self.stopped.cancelled() => {}
///         }
///         Ok(())
///     }
///
///     async fn stop(&self, _token: CancellationToken) -> anyhow::Result<()> {
///         self.stopped.cancel();
///         Ok(())
///     }
///
///     fn name(&self) -> Option<&str> {
///         Some("worker")
///     }
///
///     fn as_logger_user(&mut self) -> Option<&mut dyn UsesLogger> {
///         Some(self)
///     }
/// }
///
/// impl UsesLogger for Worker {
///     fn use_logger(&mut self, span: tracing::Span) {
///         self.log = span;
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Prepare the component. Failing here aborts process start-up.
    async fn init(&mut self, token: CancellationToken) -> anyhow::Result<()>;

    /// Run until [`Component::stop`] is called or the token is cancelled.
    ///
    /// An error is logged and ends this component's task only.
    async fn start(&self, token: CancellationToken) -> anyhow::Result<()>;

    /// Release held resources and make `start` return.
    ///
    /// The token is cancelled when the shutdown window elapses.
    async fn stop(&self, token: CancellationToken) -> anyhow::Result<()>;

    /// Display name used in diagnostics.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Type tag used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_logger_user(&mut self) -> Option<&mut dyn UsesLogger> {
        None
    }

    fn as_tracer_user(&mut self) -> Option<&mut dyn UsesTracer> {
        None
    }

    fn as_resource_user(&mut self) -> Option<&mut dyn UsesResources> {
        None
    }

    fn as_health_reporter(&self) -> Option<&dyn ReportsHealth> {
        None
    }
}

/// Accepts the span its records should be attributed to.
pub trait UsesLogger {
    fn use_logger(&mut self, span: tracing::Span);
}

/// Accepts a tracer.
pub trait UsesTracer {
    fn use_tracer(&mut self, tracer: Tracer);
}

/// Accepts shared resources such as database handles.
pub trait UsesResources {
    fn use_resources(&mut self, resources: &Resources);
}

/// Reports its own health on the status endpoint.
///
/// Only [`Health::status`] is mandatory.
pub trait ReportsHealth {
    fn healthcheck(&self) -> Health;
}

/// Diagnostic label: the display name if any, else the type tag.
pub fn describe(component: &dyn Component) -> String {
    component
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| component.type_name().to_string())
}
