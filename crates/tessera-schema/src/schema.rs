// SPDX-License-Identifier: Apache-2.0
//! Declarative response shape descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::id::EntityId;

/// How an entity's identity is derived from its raw record.
#[derive(Clone)]
pub enum IdExtractor {
    /// Read the id from a named field of the record (default: `"id"`).
    Field(String),
    /// Derive the id from the whole record via a caller-supplied function,
    /// e.g. for composite keys. Returning `None` marks the record as
    /// non-normalizable.
    Composite(Arc<dyn Fn(&Map<String, Value>) -> Option<EntityId> + Send + Sync>),
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self::Field("id".to_owned())
    }
}

impl fmt::Debug for IdExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Composite(_) => f.write_str("Composite(..)"),
        }
    }
}

impl IdExtractor {
    /// Applies the extractor to a raw record.
    #[must_use]
    pub fn extract(&self, record: &Map<String, Value>) -> Option<EntityId> {
        match self {
            Self::Field(name) => record.get(name).and_then(EntityId::from_value),
            Self::Composite(f) => f(record),
        }
    }
}

/// Schema for one entity type: its table name, how ids are derived, and which
/// of its fields are themselves schema-tracked.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    key: String,
    id: IdExtractor,
    fields: BTreeMap<String, Schema>,
}

impl EntitySchema {
    /// Creates an entity schema for the given type name with the default
    /// `"id"` extractor and no tracked fields.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: IdExtractor::default(),
            fields: BTreeMap::new(),
        }
    }

    /// Overrides the field the id is read from.
    #[must_use]
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id = IdExtractor::Field(name.into());
        self
    }

    /// Installs a composite-key extractor in place of a single id field.
    #[must_use]
    pub fn composite_id(
        mut self,
        f: impl Fn(&Map<String, Value>) -> Option<EntityId> + Send + Sync + 'static,
    ) -> Self {
        self.id = IdExtractor::Composite(Arc::new(f));
        self
    }

    /// Declares a schema-tracked field of this entity.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    /// The entity type name, i.e. the table this entity normalizes into.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The id extractor for this entity type.
    #[must_use]
    pub fn id_extractor(&self) -> &IdExtractor {
        &self.id
    }

    /// Schema for a tracked field, if the field is tracked.
    #[must_use]
    pub fn field_schema(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)
    }

    /// Iterates the tracked fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Structural descriptor of a response shape.
///
/// The cache core never interprets schemas beyond "is this slot an entity
/// reference, an array, or a nested object"; all three are represented here
/// and nothing else is.
#[derive(Debug, Clone)]
pub enum Schema {
    /// A reference to an entity of a known type.
    Entity(Arc<EntitySchema>),
    /// An object whose declared fields follow nested schemas. Fields not
    /// declared here pass through normalization untouched.
    Object(BTreeMap<String, Schema>),
    /// An ordered sequence whose elements all follow one schema.
    Array(Box<Schema>),
}

impl Schema {
    /// Convenience constructor for an object schema.
    #[must_use]
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convenience constructor for an array schema.
    #[must_use]
    pub fn array(inner: Schema) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Looks up the schema governing a named field of this slot.
    ///
    /// Only object and entity schemas have named fields; an array slot has
    /// none. Callers that need to descend through an array-of-entities field
    /// unwrap the [`Schema::Array`] themselves.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Schema> {
        match self {
            Self::Object(fields) => fields.get(name),
            Self::Entity(entity) => entity.field_schema(name),
            Self::Array(_) => None,
        }
    }
}

impl From<EntitySchema> for Schema {
    fn from(entity: EntitySchema) -> Self {
        Self::Entity(Arc::new(entity))
    }
}
