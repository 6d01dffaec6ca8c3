// SPDX-License-Identifier: Apache-2.0
//! Identifier types for subscribers and entity table slots.

use std::fmt;

use tessera_schema::EntityId;

/// Stable identifier for a tracked subscriber.
///
/// The host derives this from the subscriber's query identity (e.g. a hash of
/// the query key). Two subscribers with the same id share one skeleton slot;
/// re-ingesting under an existing id replaces the stored skeleton.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Wraps a host-provided stable key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriberId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Fully qualified slot in the entity table: type name plus identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    /// Entity type name (the table the record lives in).
    pub entity_type: String,
    /// Identity of the record within that table.
    pub id: EntityId,
}

impl EntityKey {
    /// Builds a key from its parts.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.id)
    }
}
