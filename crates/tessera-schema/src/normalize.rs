// SPDX-License-Identifier: Apache-2.0
//! Raw response → skeleton + entity fragments.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::id::EntityId;
use crate::schema::Schema;

/// Flat per-type entity tables produced by one normalization pass.
pub type EntityFragments = BTreeMap<String, BTreeMap<EntityId, Value>>;

/// Result of normalizing one raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The response with every entity slot replaced by its identifier.
    pub skeleton: Value,
    /// The extracted entity records, keyed by type then id.
    pub entities: EntityFragments,
}

/// Normalizes `data` against `schema`.
///
/// Entity slots are replaced by their extracted ids and the records land in
/// [`Normalized::entities`] (nested entity fields already replaced by ids).
/// Object fields not declared in the schema pass through untouched, so
/// carrier fields like pagination cursors survive the round trip. When the
/// same (type, id) is produced more than once in a single pass, the later
/// record wins.
///
/// # Errors
///
/// Fails when the value shape contradicts the schema (non-object where an
/// entity or object is declared, non-array where an array is declared) or
/// when an entity record yields no usable id.
pub fn normalize(data: &Value, schema: &Schema) -> Result<Normalized, SchemaError> {
    let mut entities = EntityFragments::new();
    let skeleton = walk(data, schema, &mut entities)?;
    Ok(Normalized { skeleton, entities })
}

fn walk(value: &Value, schema: &Schema, out: &mut EntityFragments) -> Result<Value, SchemaError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match schema {
        Schema::Entity(entity) => {
            // A bare id in an entity slot is already normalized; keep it and
            // produce no fragment.
            if let Some(id) = EntityId::from_value(value) {
                return Ok(id.to_value());
            }
            let Value::Object(record) = value else {
                return Err(SchemaError::ExpectedObject);
            };
            let id = entity
                .id_extractor()
                .extract(record)
                .ok_or_else(|| SchemaError::MissingId {
                    key: entity.key().to_owned(),
                })?;
            let mut normalized = record.clone();
            for (name, child) in entity.fields() {
                if let Some(raw) = record.get(name) {
                    normalized.insert(name.to_owned(), walk(raw, child, out)?);
                }
            }
            out.entry(entity.key().to_owned())
                .or_default()
                .insert(id.clone(), Value::Object(normalized));
            Ok(id.to_value())
        }
        Schema::Object(fields) => {
            let Value::Object(map) = value else {
                return Err(SchemaError::ExpectedObject);
            };
            let mut skeleton = Map::new();
            for (key, raw) in map {
                let replaced = match fields.get(key) {
                    Some(child) => walk(raw, child, out)?,
                    None => raw.clone(),
                };
                skeleton.insert(key.clone(), replaced);
            }
            Ok(Value::Object(skeleton))
        }
        Schema::Array(inner) => {
            let Value::Array(items) = value else {
                return Err(SchemaError::ExpectedArray);
            };
            let skeleton = items
                .iter()
                .map(|item| walk(item, inner, out))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(skeleton))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::EntitySchema;
    use serde_json::json;

    fn player_response_schema() -> Schema {
        let sport: Schema = EntitySchema::new("sport").into();
        let player: Schema = EntitySchema::new("player").field("sport", sport).into();
        Schema::object([("player", player)])
    }

    #[test]
    fn nested_entities_split_into_fragments() {
        let schema = player_response_schema();
        let data = json!({
            "player": { "id": 1, "rank": 1, "sport": { "id": 1, "name": "tennis" } }
        });

        let normalized = normalize(&data, &schema).unwrap();
        assert_eq!(normalized.skeleton, json!({ "player": 1 }));
        assert_eq!(
            normalized.entities.get("player").unwrap()[&EntityId::Int(1)],
            json!({ "id": 1, "rank": 1, "sport": 1 })
        );
        assert_eq!(
            normalized.entities.get("sport").unwrap()[&EntityId::Int(1)],
            json!({ "id": 1, "name": "tennis" })
        );
    }

    #[test]
    fn undeclared_object_fields_pass_through() {
        let player: Schema = EntitySchema::new("player").into();
        let schema = Schema::object([("players", Schema::array(player))]);
        let data = json!({ "players": [{ "id": 1 }, { "id": 2 }], "page": 3 });

        let normalized = normalize(&data, &schema).unwrap();
        assert_eq!(normalized.skeleton, json!({ "players": [1, 2], "page": 3 }));
    }

    #[test]
    fn bare_id_in_entity_slot_is_kept() {
        let schema = player_response_schema();
        let data = json!({ "player": 4 });

        let normalized = normalize(&data, &schema).unwrap();
        assert_eq!(normalized.skeleton, json!({ "player": 4 }));
        assert!(normalized.entities.is_empty());
    }

    #[test]
    fn null_passes_through_any_slot() {
        let schema = player_response_schema();
        let normalized = normalize(&json!({ "player": null }), &schema).unwrap();
        assert_eq!(normalized.skeleton, json!({ "player": null }));
    }

    #[test]
    fn shape_mismatches_are_reported() {
        let schema = player_response_schema();
        assert_eq!(
            normalize(&json!([1, 2]), &schema),
            Err(SchemaError::ExpectedObject)
        );
        assert_eq!(
            normalize(&json!({ "player": { "rank": 9 } }), &schema),
            Err(SchemaError::MissingId {
                key: "player".into()
            })
        );
    }

    #[test]
    fn later_fragment_for_same_identity_wins() {
        let player: Schema = EntitySchema::new("player").into();
        let schema = Schema::object([("players", Schema::array(player))]);
        let data = json!({ "players": [{ "id": 1, "rank": 1 }, { "id": 1, "rank": 2 }] });

        let normalized = normalize(&data, &schema).unwrap();
        assert_eq!(
            normalized.entities.get("player").unwrap()[&EntityId::Int(1)],
            json!({ "id": 1, "rank": 2 })
        );
    }
}
