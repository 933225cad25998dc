//! Error types for the bus, the escalation sink and the HTTP surface.
//!
//! [`BusError`] covers every failure the bus contains and escalates;
//! none of them propagate back to the publisher. [`NotifyError`] is the
//! terminal failure of the escalation sink itself. [`ApiError`] maps
//! request failures to HTTP status codes and a structured JSON body.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Failure observed by the bus while accepting or dispatching an event.
///
/// Every variant carries the rendered event so the offending event can
/// be identified from logs and alerts alone.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Publish attempted after the bus stopped; the event is dropped.
    #[error("stopped before handling event {event}")]
    Stopped {
        /// Rendered event that was dropped.
        event: String,
    },

    /// A handler returned an error.
    #[error("handler {handler} failed on {event}: {reason}")]
    HandlerFailed {
        /// Name of the failing handler.
        handler: String,
        /// Rendered event being handled.
        event: String,
        /// Full error chain returned by the handler.
        reason: String,
    },

    /// A handler did not finish before its deadline.
    #[error("handler {handler} timed out after {timeout:?} on {event}")]
    HandlerTimeout {
        /// Name of the handler that was abandoned.
        handler: String,
        /// Rendered event being handled.
        event: String,
        /// Configured handling deadline.
        timeout: Duration,
    },

    /// A handler panicked; the panic was caught by its task.
    #[error("handler {handler} panicked on {event}")]
    HandlerPanicked {
        /// Name of the panicking handler.
        handler: String,
        /// Rendered event being handled.
        event: String,
    },
}

impl BusError {
    /// Builds a [`BusError::HandlerFailed`] keeping the whole error chain.
    #[must_use]
    pub fn handler_failed(handler: &str, event: &str, err: &anyhow::Error) -> Self {
        Self::HandlerFailed {
            handler: handler.to_string(),
            event: event.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

/// Failure of the escalation sink. Logged only, never escalated.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport-level failure talking to the notification service.
    #[error("notification transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The notification service answered with a non-success status.
    #[error("notification rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body describing the rejection.
        body: String,
    },

    /// The notification did not complete within the escalation timeout.
    #[error("notification timed out after {0:?}")]
    TimedOut(Duration),
}

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: group must not be empty"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Request-level error with HTTP status code mapping.
///
/// | Code | Meaning          | HTTP Status             |
/// |------|------------------|-------------------------|
/// | 1001 | Invalid request  | 400 Bad Request         |
/// | 3001 | Bus stopped      | 503 Service Unavailable |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The bus no longer accepts events.
    #[error("event bus is stopped")]
    BusStopped,
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::BusStopped => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::BusStopped => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
