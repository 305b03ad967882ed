//! Default health handlers.
//!
//! Each one reports unavailable as soon as the process starts draining.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::component::{describe, Component};
use crate::context::AppContext;
use crate::health::model::{Health, HealthMeta, HealthStatus};

/// State shared by the default handlers.
#[derive(Clone)]
pub struct HealthState {
    ctx: Arc<AppContext>,
    components: Arc<[Arc<dyn Component>]>,
}

impl HealthState {
    pub fn new(ctx: Arc<AppContext>, components: Arc<[Arc<dyn Component>]>) -> Self {
        Self { ctx, components }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Detailed report: uptime, meta and one entry per reporting component.
    pub fn report(&self) -> Health {
        let mut health = Health::up().with_uptime(self.ctx.uptime());
        health.meta = HealthMeta::at(Utc::now(), self.ctx.settings().version.clone());

        for component in self.components.iter() {
            let Some(reporter) = component.as_health_reporter() else {
                continue;
            };
            let report = reporter.healthcheck();
            if report.status.is_impaired() {
                health.status = HealthStatus::Degraded;
            }
            health = health.with_detail(describe(component.as_ref()), report);
        }

        health
    }
}

/// 503 body shared by every health route while draining.
pub fn shutting_down() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "Shutting down").into_response()
}

/// Is the application ready to serve traffic?
///
/// Also serves the startup probe unless that one is overridden.
pub async fn readiness(State(state): State<HealthState>) -> Response {
    if state.ctx.is_draining() {
        return shutting_down();
    }
    (StatusCode::OK, HealthStatus::Up.as_str()).into_response()
}

/// Is the process alive?
pub async fn liveness(State(state): State<HealthState>) -> Response {
    if state.ctx.is_draining() {
        return shutting_down();
    }
    (StatusCode::OK, HealthStatus::Up.as_str()).into_response()
}

pub async fn status(State(state): State<HealthState>) -> Response {
    if state.ctx.is_draining() {
        return shutting_down();
    }
    (StatusCode::OK, Json(state.report())).into_response()
}
