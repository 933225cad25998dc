//! System endpoints: health check and handler registry.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `"healthy"` while the bus accepts events, `"stopping"` afterwards.
    pub status: String,
    /// Current server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// Registered handlers response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HandlerListResponse {
    /// Handler names in registration order.
    pub handlers: Vec<String>,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Bus is stopping", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (status, label) = if state.publisher.is_stopped().await {
        (StatusCode::SERVICE_UNAVAILABLE, "stopping")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /handlers` — Handlers registered on the bus.
#[utoipa::path(
    get,
    path = "/api/v1/handlers",
    tag = "System",
    summary = "List handlers",
    description = "Returns the names of the event handlers registered at startup.",
    responses(
        (status = 200, description = "Registered handlers", body = HandlerListResponse),
    )
)]
pub async fn list_handlers(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HandlerListResponse {
            handlers: state.handlers.to_vec(),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// System routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/handlers", get(list_handlers))
}
