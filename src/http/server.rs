//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Check the configured port before any component starts
//! - Create the Axum router with the health routes
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until told to shut down, then drain in-flight requests
//!
//! # Design Decisions
//! - The server task owns its listener; shutdown is requested and observed
//!   through a pair of cancellation tokens in [`ServerControl`]
//! - The server task ending abnormally, by error or panic, cancels the root
//!   token so the process drains

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::component::Component;
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::health::{HealthRoutes, HealthState};
use crate::lifecycle::orchestrator::spawn_supervised;
use crate::lifecycle::ErrorSet;
use crate::net::listener;

/// Shutdown request and completion signals for the server task.
#[derive(Debug, Clone, Default)]
pub struct ServerControl {
    shutdown: CancellationToken,
    stopped: CancellationToken,
}

impl ServerControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the server to stop accepting and drain.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Resolves once the server task has exited, for any reason.
    pub async fn stopped(&self) {
        self.stopped.cancelled().await;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_cancelled()
    }

    /// Mark the server as exited. Called by the server task on its way out.
    pub fn mark_stopped(&self) {
        self.stopped.cancel();
    }
}

/// HTTP server for health endpoints.
pub struct HttpServer {
    address: String,
    router: Router,
}

impl HttpServer {
    /// Check the port and build the router.
    ///
    /// Fails with [`Error::PortUnavailable`] when the port cannot be bound.
    pub fn init(
        ctx: &Arc<AppContext>,
        routes: HealthRoutes,
        components: Arc<[Arc<dyn Component>]>,
    ) -> Result<Self> {
        let http = &ctx.settings().http;
        let address = http.bind_address();

        listener::probe(&address).map_err(|source| Error::PortUnavailable {
            port: http.port,
            source,
        })?;

        let state = HealthState::new(Arc::clone(ctx), components);
        let router = Self::build_router(routes.into_router(state), http.request_timeout());

        Ok(Self { address, router })
    }

    /// Apply the middleware stack. Request IDs are set before tracing so
    /// every request span carries one.
    #[allow(deprecated)]
    fn build_router(router: Router, timeout: std::time::Duration) -> Router {
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(timeout)),
        )
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on a tracked task until `control` requests shutdown.
    pub fn start(
        self,
        control: ServerControl,
        tracker: &TaskTracker,
        errors: ErrorSet,
        root: CancellationToken,
    ) {
        let shutdown = control.shutdown.clone();
        let listener = serve(self.address, self.router, shutdown);
        spawn_listener(tracker, control, errors, root, listener);
    }
}

/// Run `listener` as the tracked server task.
///
/// However the task ends, `control` is marked stopped. Unless `listener`
/// returns `Ok`, `root` is cancelled as well so the process drains; a panic
/// unwinds through the same guard.
fn spawn_listener<F>(
    tracker: &TaskTracker,
    control: ServerControl,
    errors: ErrorSet,
    root: CancellationToken,
    listener: F,
) where
    F: Future<Output = io::Result<()>> + Send + 'static,
{
    let sink = errors.clone();
    let task = async move {
        let _stopped = control.stopped.clone().drop_guard();
        let drain = root.drop_guard();
        match listener.await {
            Ok(()) => {
                drain.disarm();
            }
            Err(e) => {
                tracing::error!(error = %e, "HTTP server stopped with unexpected error");
                sink.push(Error::HttpServe(e));
            }
        }
    };

    spawn_supervised(tracker, "http server".to_string(), errors, task);
}

async fn serve(address: String, router: Router, shutdown: CancellationToken) -> io::Result<()> {
    let listener = listener::bind(&address).await?;
    tracing::info!(address = %listener.local_addr()?, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::lifecycle::DrainFlag;

    fn context(port: u16) -> Arc<AppContext> {
        let mut settings = Settings::default();
        settings.http.host = "127.0.0.1".into();
        settings.http.port = port;
        Arc::new(AppContext::new(settings, DrainFlag::new()))
    }

    fn free_port() -> u16 {
        TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[test]
    fn occupied_port_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = HttpServer::init(&context(port), HealthRoutes::default(), Arc::from(Vec::new()))
            .err()
            .expect("port is taken");
        assert!(matches!(err, Error::PortUnavailable { port: p, .. } if p == port));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let server =
            HttpServer::init(&context(free_port()), HealthRoutes::default(), Arc::from(Vec::new()))
                .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::get("/.well-known/health/alive")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn caller_request_id_is_kept() {
        let server =
            HttpServer::init(&context(free_port()), HealthRoutes::default(), Arc::from(Vec::new()))
                .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::get("/.well-known/health/ready")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn server_stops_when_asked() {
        let server =
            HttpServer::init(&context(free_port()), HealthRoutes::default(), Arc::from(Vec::new()))
                .unwrap();
        let control = ServerControl::new();
        let tracker = TaskTracker::new();
        let errors = ErrorSet::new();
        let root = CancellationToken::new();

        server.start(control.clone(), &tracker, errors.clone(), root.clone());
        tracker.close();

        control.shutdown();
        tokio::time::timeout(Duration::from_secs(5), control.stopped())
            .await
            .expect("server drains");
        tracker.wait().await;

        assert!(errors.is_empty());
        assert!(!root.is_cancelled());
    }

    #[tokio::test]
    async fn bind_failure_cancels_root() {
        let port = free_port();
        let server =
            HttpServer::init(&context(port), HealthRoutes::default(), Arc::from(Vec::new()))
                .unwrap();
        let _taken = TcpListener::bind(("127.0.0.1", port)).unwrap();

        let control = ServerControl::new();
        let tracker = TaskTracker::new();
        let errors = ErrorSet::new();
        let root = CancellationToken::new();
        server.start(control.clone(), &tracker, errors.clone(), root.clone());
        tracker.close();
        tracker.wait().await;

        assert!(root.is_cancelled());
        assert!(control.is_stopped());
        let err = errors.into_result().unwrap_err();
        assert!(matches!(err, Error::HttpServe(_)));
    }

    async fn failing_accept_loop() -> io::Result<()> {
        panic!("accept loop failed")
    }

    #[tokio::test]
    async fn listener_panic_cancels_root() {
        let control = ServerControl::new();
        let tracker = TaskTracker::new();
        let errors = ErrorSet::new();
        let root = CancellationToken::new();

        spawn_listener(
            &tracker,
            control.clone(),
            errors.clone(),
            root.clone(),
            failing_accept_loop(),
        );
        tracker.close();
        tracker.wait().await;

        assert!(root.is_cancelled());
        assert!(control.is_stopped());
        let err = errors.into_result().unwrap_err();
        assert!(
            matches!(err, Error::Panicked { ref message, .. } if message.contains("accept loop failed"))
        );
    }
}
