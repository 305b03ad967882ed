//! Health route table.
//!
//! Four fixed routes under [`BASE_PATH`], each independently configurable:
//! the built-in handler, a custom one, or not mounted at all.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, MethodRouter},
    Router,
};

use crate::health::handlers::{self, HealthState};
use crate::lifecycle::DrainFlag;

pub const BASE_PATH: &str = "/.well-known/health";

/// How one health route is served.
#[derive(Default)]
pub enum HealthRoute {
    /// The built-in handler.
    #[default]
    Default,
    /// A caller-supplied handler, e.g. `axum::routing::get(my_check)`.
    Custom(MethodRouter),
    /// Not mounted.
    Disabled,
}

impl HealthRoute {
    fn resolve(self, default: impl FnOnce() -> MethodRouter) -> Option<MethodRouter> {
        match self {
            HealthRoute::Default => Some(default()),
            HealthRoute::Custom(route) => Some(route),
            HealthRoute::Disabled => None,
        }
    }
}

impl std::fmt::Debug for HealthRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthRoute::Default => f.write_str("Default"),
            HealthRoute::Custom(_) => f.write_str("Custom"),
            HealthRoute::Disabled => f.write_str("Disabled"),
        }
    }
}

/// The health route table.
#[derive(Debug, Default)]
pub struct HealthRoutes {
    /// `GET /startup`: has start-up completed?
    pub startup: HealthRoute,
    /// `GET /alive`: should the process be kept running?
    pub liveness: HealthRoute,
    /// `GET /ready`: should the process receive traffic?
    pub readiness: HealthRoute,
    /// `GET /status`: detailed report.
    pub status: HealthRoute,
}

impl HealthRoutes {
    /// No health routes at all.
    pub fn disabled() -> Self {
        Self {
            startup: HealthRoute::Disabled,
            liveness: HealthRoute::Disabled,
            readiness: HealthRoute::Disabled,
            status: HealthRoute::Disabled,
        }
    }

    pub fn with_startup(mut self, route: MethodRouter) -> Self {
        self.startup = HealthRoute::Custom(route);
        self
    }

    pub fn with_liveness(mut self, route: MethodRouter) -> Self {
        self.liveness = HealthRoute::Custom(route);
        self
    }

    pub fn with_readiness(mut self, route: MethodRouter) -> Self {
        self.readiness = HealthRoute::Custom(route);
        self
    }

    pub fn with_status(mut self, route: MethodRouter) -> Self {
        self.status = HealthRoute::Custom(route);
        self
    }

    /// Build the router, guarding every mounted route with the draining flag.
    pub fn into_router(self, state: HealthState) -> Router {
        let mounted = [
            (
                "/startup",
                self.startup
                    .resolve(|| get(handlers::readiness).with_state(state.clone())),
            ),
            (
                "/alive",
                self.liveness
                    .resolve(|| get(handlers::liveness).with_state(state.clone())),
            ),
            (
                "/ready",
                self.readiness
                    .resolve(|| get(handlers::readiness).with_state(state.clone())),
            ),
            (
                "/status",
                self.status
                    .resolve(|| get(handlers::status).with_state(state.clone())),
            ),
        ];

        let mut health = Router::new();
        let mut any_mounted = false;
        for (path, route) in mounted {
            if let Some(route) = route {
                health = health.route(path, route);
                any_mounted = true;
            }
        }

        if !any_mounted {
            return Router::new();
        }

        let draining = state.context().draining().clone();
        let health = health.route_layer(middleware::from_fn_with_state(draining, draining_guard));
        Router::new().nest(BASE_PATH, health)
    }
}

/// Answers 503 on every health route once draining, whatever the handler.
async fn draining_guard(State(draining): State<DrainFlag>, request: Request, next: Next) -> Response {
    if draining.is_draining() {
        return handlers::shutting_down();
    }
    next.run(request).await
}
