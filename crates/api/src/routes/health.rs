//! Health endpoints.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use telemetry::{health, metrics, ComponentReport, MetricsSnapshot};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub components: Vec<ComponentReport>,
    pub metrics: MetricsSnapshot,
}

/// GET /health - component report plus a metrics snapshot.
pub async fn health_handler() -> Json<HealthResponse> {
    let ready = health().is_ready();
    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        components: health().report(),
        metrics: metrics().snapshot(),
    })
}

/// GET /health/ready - readiness probe (can serve redirects).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - liveness probe (process is running).
pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}
