// SPDX-License-Identifier: Apache-2.0
//! Reverse index from entity identity to dependent subscribers.

use std::collections::{BTreeMap, BTreeSet};

use tessera_schema::EntityId;

use crate::ident::{EntityKey, SubscriberId};

/// Mapping from (entity type, entity id) to the subscribers whose skeleton
/// references that entity.
///
/// # Invariants
/// - A subscriber appears under (type, id) iff its current skeleton contains
///   a reference to that (type, id); the cache registers entries during
///   ingest and prunes them on subscriber removal.
/// - A bucket that drains to empty is deleted together with its entity
///   record (cascade garbage collection).
#[derive(Debug, Default, Clone)]
pub struct DependencyIndex {
    buckets: BTreeMap<String, BTreeMap<EntityId, BTreeSet<SubscriberId>>>,
}

impl DependencyIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `subscriber`'s skeleton references `(entity_type, id)`.
    pub(crate) fn register(&mut self, entity_type: &str, id: EntityId, subscriber: SubscriberId) {
        self.buckets
            .entry(entity_type.to_owned())
            .or_default()
            .entry(id)
            .or_default()
            .insert(subscriber);
    }

    /// The subscribers currently dependent on `(entity_type, id)`.
    #[must_use]
    pub fn dependents(&self, entity_type: &str, id: &EntityId) -> Option<&BTreeSet<SubscriberId>> {
        self.buckets.get(entity_type)?.get(id)
    }

    /// Discards `subscriber` from every bucket.
    ///
    /// Returns the keys whose dependent set drained to empty; those buckets
    /// are already deleted and their entity records are now garbage.
    pub(crate) fn discard_subscriber(&mut self, subscriber: &SubscriberId) -> Vec<EntityKey> {
        let mut orphaned = Vec::new();
        for (entity_type, ids) in &mut self.buckets {
            ids.retain(|id, subscribers| {
                subscribers.remove(subscriber);
                if subscribers.is_empty() {
                    orphaned.push(EntityKey::new(entity_type.clone(), id.clone()));
                    false
                } else {
                    true
                }
            });
        }
        orphaned
    }

    /// Drops the bucket for `(entity_type, id)` regardless of content.
    pub(crate) fn remove_bucket(&mut self, entity_type: &str, id: &EntityId) {
        if let Some(ids) = self.buckets.get_mut(entity_type) {
            ids.remove(id);
        }
    }

    /// Whether no dependency is recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BTreeMap::is_empty)
    }

    /// Drops everything.
    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_reports_drained_buckets() {
        let mut index = DependencyIndex::new();
        let q1 = SubscriberId::new("q1");
        let q2 = SubscriberId::new("q2");
        index.register("player", EntityId::Int(1), q1.clone());
        index.register("player", EntityId::Int(1), q2.clone());
        index.register("sport", EntityId::Int(1), q1.clone());

        let orphaned = index.discard_subscriber(&q1);
        assert_eq!(orphaned, vec![EntityKey::new("sport", 1)]);
        assert_eq!(
            index.dependents("player", &EntityId::Int(1)),
            Some(&BTreeSet::from([q2]))
        );
        assert!(index.dependents("sport", &EntityId::Int(1)).is_none());
    }

    #[test]
    fn discarding_the_last_subscriber_empties_the_index() {
        let mut index = DependencyIndex::new();
        let q1 = SubscriberId::new("q1");
        index.register("player", EntityId::Int(1), q1.clone());
        let orphaned = index.discard_subscriber(&q1);
        assert_eq!(orphaned.len(), 1);
        assert!(index.is_empty());
    }
}
