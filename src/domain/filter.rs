//! Wildcard filter for routing events to handlers.
//!
//! A [`Filter`] is a partial pattern over the fields of a
//! [`super::QualifiedId`]. Empty fields are wildcards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Event;

/// Partial-match pattern over qualified identity fields.
///
/// The filter matches an event when every non-empty field equals the
/// corresponding field of the event. An all-empty filter is a legal
/// catch-all and matches every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    /// Required subdomain, or empty for any.
    #[serde(default)]
    pub sub: String,
    /// Required group, or empty for any.
    #[serde(default)]
    pub group: String,
    /// Required entity ID, or empty for any.
    #[serde(default)]
    pub id: String,
}

impl Filter {
    /// Returns the catch-all filter.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the filter to the given subdomain.
    #[must_use]
    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = sub.into();
        self
    }

    /// Restricts the filter to the given group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Restricts the filter to the given entity ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns `true` if every non-empty field equals the event's field.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        field_matches(&self.id, &event.id.id)
            && field_matches(&self.group, &event.id.group)
            && field_matches(&self.sub, &event.id.sub)
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.sub.is_empty() && self.group.is_empty() && self.id.is_empty()
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern.is_empty() || pattern == value
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({}, {}, {})", self.sub, self.group, self.id)
    }
}
