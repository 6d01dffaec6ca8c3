// SPDX-License-Identifier: Apache-2.0
//! Schema-guided removal of a deleted entity id from stored skeletons.

use serde_json::{Map, Value};
use tessera_schema::Schema;

/// Whether `schema` is a reference to the deleted entity's type.
pub(crate) fn references_type(schema: &Schema, entity_type: &str) -> bool {
    matches!(schema, Schema::Entity(entity) if entity.key() == entity_type)
}

/// Rewrites `skeleton` with every reference to the deleted `(entity_type,
/// target)` removed, using the subscriber's effective schema as a structural
/// guide. Sets `modified` when a removal actually happened, so callers can
/// skip rewriting (and thus renotifying) skeletons the schema claimed would
/// contain the id but did not.
///
/// Walk rules:
/// - array slots guided by a reference to the deleted type drop elements
///   equal to `target`;
/// - object fields equal to `target` whose slot references the deleted type
///   are dropped entirely;
/// - object/array fields with any nested schema recurse with that schema,
///   unwrapping one array-of level so `field: [entity]` guides the field's
///   sequence value;
/// - a field holding the id under a key with no schema entry is left
///   untouched. Only explicit relations are schema-tracked; hosts may store
///   untracked scalar fields shaped like ids.
///
/// Matching is by id *and* referenced type: a `player` slot holding id 1
/// survives the deletion of `sport/1` even though the raw id collides.
pub(crate) fn prune_entity_ref(
    skeleton: &Value,
    schema: Option<&Schema>,
    entity_type: &str,
    target: &Value,
    modified: &mut bool,
) -> Value {
    match skeleton {
        Value::Null => Value::Null,
        Value::Array(items) => {
            // The slot schema may still carry its array-of level (top-level
            // entity lists, arrays nested in arrays); elements are guided by
            // the unwrapped element schema.
            let elem = schema.map(|s| match s {
                Schema::Array(inner) => inner.as_ref(),
                other => other,
            });
            let deleted_slot = elem.is_some_and(|s| references_type(s, entity_type));
            let mut kept = Vec::with_capacity(items.len());
            for item in items {
                if matches!(item, Value::Object(_) | Value::Array(_) | Value::Null) {
                    kept.push(prune_entity_ref(item, elem, entity_type, target, modified));
                } else if item == target && deleted_slot {
                    *modified = true;
                } else {
                    kept.push(item.clone());
                }
            }
            Value::Array(kept)
        }
        Value::Object(fields) => {
            let mut kept = Map::new();
            for (key, value) in fields {
                let child = schema.and_then(|s| s.child(key)).map(|c| match c {
                    Schema::Array(inner) => inner.as_ref(),
                    other => other,
                });
                if value == target && child.is_some_and(|c| references_type(c, entity_type)) {
                    *modified = true;
                    continue;
                }
                if matches!(value, Value::Object(_) | Value::Array(_)) && child.is_some() {
                    kept.insert(
                        key.clone(),
                        prune_entity_ref(value, child, entity_type, target, modified),
                    );
                } else {
                    kept.insert(key.clone(), value.clone());
                }
            }
            Value::Object(kept)
        }
        other => other.clone(),
    }
}
