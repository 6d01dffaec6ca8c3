// SPDX-License-Identifier: Apache-2.0
//! De-duplicated entity record storage.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tessera_schema::{EntityId, EntityLookup};

use crate::ident::EntityKey;

/// Ordered set of table slots touched by one mutating call.
///
/// The coordinator collects touched keys while a call's writes run, then
/// drains the set through a single invalidation pass. Ordering makes the
/// recomputation and delivery order deterministic.
pub(crate) type TouchedSet = BTreeSet<EntityKey>;

/// Flat per-type entity storage: type name → id → record.
///
/// There is exactly one record per (type, id); every subscriber skeleton that
/// mentions the id shares it. All mutation goes through [`EntityCache`]
/// methods so the invalidation pass can never be skipped.
///
/// [`EntityCache`]: crate::EntityCache
#[derive(Debug, Default, Clone)]
pub struct EntityTable {
    records: BTreeMap<String, BTreeMap<EntityId, Value>>,
}

impl EntityTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record stored at `(entity_type, id)`, if any.
    #[must_use]
    pub fn record(&self, entity_type: &str, id: &EntityId) -> Option<&Value> {
        self.records.get(entity_type)?.get(id)
    }

    /// Iterates all records of one type in id order.
    pub fn records_of(&self, entity_type: &str) -> impl Iterator<Item = (&EntityId, &Value)> {
        self.records.get(entity_type).into_iter().flatten()
    }

    /// Iterates the entity type names present in the table.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of records stored for one type.
    #[must_use]
    pub fn len_of(&self, entity_type: &str) -> usize {
        self.records.get(entity_type).map_or(0, BTreeMap::len)
    }

    /// Whether no record of any type is stored.
    ///
    /// Empty per-type buckets left behind by deletion do not count as
    /// content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.values().all(BTreeMap::is_empty)
    }

    /// Writes a record, returning whether the slot actually changed.
    ///
    /// A write of a deeply-equal record is skipped: an unconditional
    /// overwrite would retrigger recomputation for every other subscriber
    /// sharing the entity.
    pub(crate) fn write(&mut self, entity_type: &str, id: EntityId, record: Value) -> bool {
        let bucket = self.records.entry(entity_type.to_owned()).or_default();
        if bucket.get(&id) == Some(&record) {
            return false;
        }
        bucket.insert(id, record);
        true
    }

    /// Writes a record even when deeply equal to the stored one.
    pub(crate) fn write_forced(&mut self, entity_type: &str, id: EntityId, record: Value) {
        self.records
            .entry(entity_type.to_owned())
            .or_default()
            .insert(id, record);
    }

    /// Removes a record, returning whether it existed.
    ///
    /// The per-type bucket is kept (possibly empty), mirroring the table
    /// shape a reader observes after deletion.
    pub(crate) fn remove(&mut self, entity_type: &str, id: &EntityId) -> bool {
        self.records
            .get_mut(entity_type)
            .is_some_and(|bucket| bucket.remove(id).is_some())
    }

    /// Drops everything.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

impl EntityLookup for EntityTable {
    fn record(&self, entity_type: &str, id: &EntityId) -> Option<&Value> {
        Self::record(self, entity_type, id)
    }
}
