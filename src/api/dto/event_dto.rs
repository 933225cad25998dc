//! Event publishing and inspection DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Event, QualifiedId};
use crate::error::ApiError;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishEventRequest {
    /// Subdomain of the changed entity (e.g. `"data"`).
    #[serde(default)]
    pub sub: String,
    /// Group of the changed entity (e.g. `"securities"`). Required.
    pub group: String,
    /// ID of the changed entity (e.g. `"AKRN"`). Required.
    pub id: String,
    /// Moment of the change. Defaults to the time of the request.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Opaque data associated with the change.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

impl PublishEventRequest {
    /// Validates the request and builds the domain event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if `group` or `id` is blank.
    pub fn into_event(self) -> Result<Event, ApiError> {
        if self.group.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                "group must not be empty".to_string(),
            ));
        }
        if self.id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("id must not be empty".to_string()));
        }

        Ok(Event::new(
            QualifiedId::new(self.sub, self.group, self.id),
            self.timestamp.unwrap_or_else(Utc::now),
            self.payload,
        ))
    }
}

/// Response body for `POST /events`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishEventResponse {
    /// Whether the bus accepted the event.
    pub accepted: bool,
    /// Rendered event, as it appears in logs and alerts.
    pub event: String,
}

/// An event as returned by `GET /events/recent`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    /// Subdomain of the changed entity.
    pub sub: String,
    /// Group of the changed entity.
    pub group: String,
    /// ID of the changed entity.
    pub id: String,
    /// Moment of the change.
    pub timestamp: DateTime<Utc>,
    /// Data associated with the change.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            sub: event.id.sub,
            group: event.id.group,
            id: event.id.id,
            timestamp: event.timestamp,
            payload: event.payload,
        }
    }
}

/// Response body for `GET /events/recent`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentEventsResponse {
    /// Recently dispatched events, newest first.
    pub events: Vec<EventDto>,
    /// Number of events returned.
    pub count: usize,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request(group: &str, id: &str) -> PublishEventRequest {
        PublishEventRequest {
            sub: "data".to_string(),
            group: group.to_string(),
            id: id.to_string(),
            timestamp: None,
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn builds_event_with_current_time() {
        let before = Utc::now();
        let Ok(event) = request("usd", "RUB").into_event() else {
            panic!("valid request");
        };
        assert_eq!(event.id, QualifiedId::new("data", "usd", "RUB"));
        assert!(event.timestamp >= before);
    }

    #[test]
    fn rejects_blank_group_or_id() {
        assert!(matches!(
            request(" ", "RUB").into_event(),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            request("usd", "").into_event(),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn deserializes_minimal_body() {
        let json = r#"{"group":"securities","id":"AKRN"}"#;
        let Ok(req) = serde_json::from_str::<PublishEventRequest>(json) else {
            panic!("deserialization failed");
        };
        assert!(req.sub.is_empty());
        assert!(req.timestamp.is_none());
        assert!(req.payload.is_null());
    }
}
