//! REST API layer: route handlers, DTOs, OpenAPI document, and router
//! composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` and the
//! OpenAPI document live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// Path serving the OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "poptimizer-bus",
        description = "In-process event bus with bounded fan-out and failure escalation"
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::list_handlers,
        handlers::events::publish_event,
        handlers::events::recent_events,
    ),
    components(schemas(
        dto::PublishEventRequest,
        dto::PublishEventResponse,
        dto::EventDto,
        dto::RecentEventsResponse,
        handlers::system::HealthResponse,
        handlers::system::HandlerListResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Events", description = "Publishing and inspecting bus events"),
        (name = "System", description = "Health and registry"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_routes())
}

#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    Router::from(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
        axum::Json(ApiDoc::openapi())
    }

    Router::new().route(OPENAPI_PATH, axum::routing::get(openapi_json))
}
