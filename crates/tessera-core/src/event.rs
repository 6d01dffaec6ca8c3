// SPDX-License-Identifier: Apache-2.0
//! Out-of-band entity event intake.

use serde_json::Value;
use tessera_schema::EntityId;

/// An entity-level event pushed from outside any subscriber's fetch
/// lifecycle (e.g. a server-sent stream of entity state changes).
///
/// The core carries these fields opaquely; only the installed
/// [`EventMapper`] gives them meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEvent {
    /// Event identifier as issued by the producer.
    pub id: String,
    /// Monotonic sequence number within the producer's stream.
    pub sequence: u64,
    /// Producer timestamp, unix milliseconds.
    pub timestamp: i64,
    /// Entity type the event concerns.
    pub entity_type: String,
    /// Producer-defined event type tag.
    pub event_type: String,
    /// Raw event payload.
    pub payload: Value,
    /// Key fields identifying the affected entity.
    pub entity_keys: Value,
    /// Entity state carried by the event, if any.
    pub entity_state: Value,
    /// Producer-defined status tag.
    pub status: String,
}

/// What one event means for the entity table, as decided by the host's
/// mapping function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMapping {
    /// Entity type to update.
    pub entity_type: String,
    /// Identity of the affected record.
    pub id: EntityId,
    /// Replacement record data (ignored when `delete_entity` is set).
    pub data: Value,
    /// Delete the entity instead of merging `data`.
    pub delete_entity: bool,
    /// Write `data` even when deeply equal to the stored record.
    pub force_add: bool,
}

impl EventMapping {
    /// A plain merge of `data` at `(entity_type, id)`.
    #[must_use]
    pub fn merge(entity_type: impl Into<String>, id: impl Into<EntityId>, data: Value) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            data,
            delete_entity: false,
            force_add: false,
        }
    }

    /// A deletion of the entity at `(entity_type, id)`.
    #[must_use]
    pub fn delete(entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            data: Value::Null,
            delete_entity: true,
            force_add: false,
        }
    }

    /// Marks the merge as unconditional, bypassing the deep-equality skip.
    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force_add = true;
        self
    }
}

/// Host-supplied translation from an [`EntityEvent`] to a table mutation.
///
/// Returning `None` ignores the event.
pub type EventMapper = Box<dyn Fn(&EntityEvent) -> Option<EventMapping>>;
