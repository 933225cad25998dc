//! Event endpoints: publish into the bus, inspect recent traffic.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{EventDto, PublishEventRequest, PublishEventResponse, RecentEventsResponse};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /events` — Publish an event into the bus.
///
/// Returns once the bus has accepted the event; handling happens
/// asynchronously and failures surface only through the escalation sink.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for a blank group or ID and
/// [`ApiError::BusStopped`] when the bus rejects the event, including a
/// publish still waiting for inbox capacity when shutdown begins.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Publish an event",
    description = "Hands the event to the bus. Handling is asynchronous; handler failures are escalated, not returned.",
    request_body = PublishEventRequest,
    responses(
        (status = 202, description = "Event accepted by the bus", body = PublishEventResponse),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 503, description = "Bus is stopped", body = ErrorResponse),
    )
)]
pub async fn publish_event(
    State(state): State<AppState>,
    Json(req): Json<PublishEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event = req.into_event()?;

    let rendered = event.to_string();
    state
        .publisher
        .try_publish(event)
        .await
        .map_err(|_stopped| ApiError::BusStopped)?;
    tracing::info!(event = %rendered, "event published over http");

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishEventResponse {
            accepted: true,
            event: rendered,
        }),
    ))
}

/// `GET /events/recent` — Recently dispatched events, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/events/recent",
    tag = "Events",
    summary = "Recent events",
    description = "Returns the events most recently recorded by the journal handler.",
    responses(
        (status = 200, description = "Recent events", body = RecentEventsResponse),
    )
)]
pub async fn recent_events(State(state): State<AppState>) -> impl IntoResponse {
    let events: Vec<EventDto> = state
        .journal
        .recent()
        .await
        .into_iter()
        .map(EventDto::from)
        .collect();
    let count = events.len();
    (StatusCode::OK, Json(RecentEventsResponse { events, count }))
}

/// Event routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(publish_event))
        .route("/events/recent", get(recent_events))
}
