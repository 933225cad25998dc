//! Qualified identity of a domain entity.
//!
//! Every domain object belongs to a subdomain, to a group of homogeneous
//! objects inside that subdomain, and has an ID that is unique within the
//! group. [`QualifiedId`] is that triple.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The `{sub, group, id}` triple uniquely naming a domain entity.
///
/// Immutable value type; equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedId {
    /// Subdomain the entity belongs to (e.g. `"data"`).
    pub sub: String,
    /// Group of homogeneous entities within the subdomain (e.g. `"securities"`).
    pub group: String,
    /// Entity ID, unique within the group (e.g. `"AKRN"`).
    pub id: String,
}

impl QualifiedId {
    /// Creates a new qualified identity.
    #[must_use]
    pub fn new(sub: impl Into<String>, group: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            group: group.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedId({}, {}, {})", self.sub, self.group, self.id)
    }
}
