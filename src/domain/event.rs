//! Domain events describing entity changes.
//!
//! An [`Event`] says "entity X changed at time T, with associated data".
//! Events are produced by domain logic, published through the
//! [`crate::bus::Publisher`] and consumed by [`super::EventHandler`]s.
//! The bus never persists them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::QualifiedId;

/// Date-only format used when rendering events for logs and alerts.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d";

/// Immutable record of a change to a domain entity.
///
/// The payload is opaque to the bus: it is carried as a JSON value and
/// handlers decode it into their own types with [`Event::payload_as`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identity of the entity that changed.
    #[serde(flatten)]
    pub id: QualifiedId,
    /// Moment the change became effective.
    pub timestamp: DateTime<Utc>,
    /// Data associated with the change.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    /// Creates an event with an explicit timestamp.
    #[must_use]
    pub fn new(id: QualifiedId, timestamp: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }

    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn now(id: QualifiedId, payload: serde_json::Value) -> Self {
        Self::new(id, Utc::now(), payload)
    }

    /// Decodes the payload into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload does not have the
    /// shape of `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event({}, {}, {}, {})",
            self.id.sub,
            self.id.group,
            self.id.id,
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}
