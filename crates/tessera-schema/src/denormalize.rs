// SPDX-License-Identifier: Apache-2.0
//! Skeleton + entity tables → reconstructed response.

use serde_json::{Map, Value};

use crate::id::EntityId;
use crate::normalize::EntityFragments;
use crate::schema::{EntitySchema, Schema};

/// Read capability over per-type entity tables.
///
/// Denormalization only ever needs point lookups; the cache core implements
/// this on its entity table, and [`EntityFragments`] implements it directly
/// for tests and preload-style uses.
pub trait EntityLookup {
    /// Returns the stored record for `(entity_type, id)`, if present.
    fn record(&self, entity_type: &str, id: &EntityId) -> Option<&Value>;
}

impl EntityLookup for EntityFragments {
    fn record(&self, entity_type: &str, id: &EntityId) -> Option<&Value> {
        self.get(entity_type)?.get(id)
    }
}

/// Denormalizes `skeleton` against `schema`, resolving entity references
/// through `table`.
///
/// This transform is total. At skeleton positions (object fields, array
/// elements) an id whose record is missing from the table stays a bare id;
/// preload detection depends on an unresolvable input coming back unchanged.
/// Inside an entity record, a tracked single-reference field whose target
/// record is gone resolves to an absent field instead, so views materialized
/// after a deletion carry no dangling reference. Values whose shape does not
/// match the schema are returned unchanged, and a reference cycle (entity A
/// referencing B referencing A) resolves each entity once along any path and
/// leaves the back-reference as a bare id rather than recursing forever.
#[must_use]
pub fn denormalize(skeleton: &Value, schema: &Schema, table: &dyn EntityLookup) -> Value {
    let mut visiting = Vec::new();
    resolve(skeleton, schema, table, &mut visiting)
}

fn resolve(
    value: &Value,
    schema: &Schema,
    table: &dyn EntityLookup,
    visiting: &mut Vec<(String, EntityId)>,
) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match schema {
        Schema::Entity(entity) => resolve_entity(value, entity, table, visiting),
        Schema::Object(fields) => {
            let Value::Object(map) = value else {
                return value.clone();
            };
            let mut resolved = Map::new();
            for (key, raw) in map {
                let child = match fields.get(key) {
                    Some(child) => resolve(raw, child, table, visiting),
                    None => raw.clone(),
                };
                resolved.insert(key.clone(), child);
            }
            Value::Object(resolved)
        }
        Schema::Array(inner) => {
            let Value::Array(items) = value else {
                return value.clone();
            };
            Value::Array(
                items
                    .iter()
                    .map(|item| resolve(item, inner, table, visiting))
                    .collect(),
            )
        }
    }
}

fn resolve_entity(
    value: &Value,
    entity: &EntitySchema,
    table: &dyn EntityLookup,
    visiting: &mut Vec<(String, EntityId)>,
) -> Value {
    if let Some(id) = EntityId::from_value(value) {
        let key = (entity.key().to_owned(), id.clone());
        if visiting.contains(&key) {
            // Back-reference along the current resolution path; keep the id.
            return value.clone();
        }
        let Some(record) = table.record(entity.key(), &id) else {
            return value.clone();
        };
        visiting.push(key);
        let resolved = resolve_record(record, entity, table, visiting);
        visiting.pop();
        return resolved;
    }
    // An entity slot that still holds a nested object (e.g. preload input
    // that was never normalized): resolve its tracked fields in place.
    resolve_record(value, entity, table, visiting)
}

fn resolve_record(
    record: &Value,
    entity: &EntitySchema,
    table: &dyn EntityLookup,
    visiting: &mut Vec<(String, EntityId)>,
) -> Value {
    let Value::Object(map) = record else {
        return record.clone();
    };
    let mut resolved = map.clone();
    for (name, child) in entity.fields() {
        let Some(raw) = map.get(name) else {
            continue;
        };
        if let (Schema::Entity(child_entity), Some(id)) = (child, EntityId::from_value(raw)) {
            let key = (child_entity.key().to_owned(), id.clone());
            if visiting.contains(&key) {
                // Back-reference; the bare id already in place stands.
                continue;
            }
            match table.record(child_entity.key(), &id) {
                Some(nested) => {
                    visiting.push(key);
                    let value = resolve_record(nested, child_entity, table, visiting);
                    visiting.pop();
                    resolved.insert(name.to_owned(), value);
                }
                None => {
                    // Dangling reference (entity was deleted): the field is
                    // absent in the materialized view.
                    resolved.remove(name);
                }
            }
            continue;
        }
        resolved.insert(name.to_owned(), resolve(raw, child, table, visiting));
    }
    Value::Object(resolved)
}
