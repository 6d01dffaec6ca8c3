// SPDX-License-Identifier: Apache-2.0
//! Update coordinator: ingest, targeted invalidation, deletion, events,
//! preload.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tessera_schema::{denormalize, normalize, EntityId, Schema};
use tracing::{debug, trace, warn};

use crate::delete::{prune_entity_ref, references_type};
use crate::deps::DependencyIndex;
use crate::event::{EntityEvent, EventMapper};
use crate::ident::{EntityKey, SubscriberId};
use crate::port::SubscriberPort;
use crate::subscriber::{effective_schema, Subscriber};
use crate::table::{EntityTable, TouchedSet};

/// The entity-normalized cache.
///
/// Owns the entity table, the per-subscriber skeletons, and the dependency
/// index, and coordinates every mutation through one write-then-invalidate
/// path: within a single ingest/delete/event call, all table writes complete
/// first, then one invalidation pass recomputes the view of each dependent
/// subscriber against the fully updated table and delivers it through the
/// port only when it differs from what that subscriber last saw.
///
/// All operations are synchronous pure computation over in-memory state;
/// boundary misuse (absent data, unmappable events, non-normalizable
/// responses) is logged and skipped rather than surfaced as an error.
pub struct EntityCache<P: SubscriberPort> {
    table: EntityTable,
    deps: DependencyIndex,
    skeletons: FxHashMap<SubscriberId, Value>,
    delivered: FxHashMap<SubscriberId, Value>,
    subscribers: FxHashMap<SubscriberId, Subscriber>,
    port: P,
    event_mapper: Option<EventMapper>,
}

impl<P: SubscriberPort> EntityCache<P> {
    /// Creates an empty cache delivering through `port`.
    #[must_use]
    pub fn new(port: P) -> Self {
        Self {
            table: EntityTable::new(),
            deps: DependencyIndex::new(),
            skeletons: FxHashMap::default(),
            delivered: FxHashMap::default(),
            subscribers: FxHashMap::default(),
            port,
            event_mapper: None,
        }
    }

    /// Installs the mapping function that gives entity events meaning.
    #[must_use]
    pub fn with_event_mapper(mut self, mapper: EventMapper) -> Self {
        self.event_mapper = Some(mapper);
        self
    }

    /// Read access to the entity table.
    #[must_use]
    pub fn table(&self) -> &EntityTable {
        &self.table
    }

    /// Read access to the dependency index.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyIndex {
        &self.deps
    }

    /// The stored skeleton for a subscriber, if any.
    #[must_use]
    pub fn skeleton(&self, subscriber: &SubscriberId) -> Option<&Value> {
        self.skeletons.get(subscriber)
    }

    /// The value most recently delivered to (or ingested for) a subscriber.
    #[must_use]
    pub fn last_delivered(&self, subscriber: &SubscriberId) -> Option<&Value> {
        self.delivered.get(subscriber)
    }

    /// Ingests a response for a subscriber.
    ///
    /// Absent data and non-normalizable responses are pass-through no-ops:
    /// the subscriber's raw value is simply never entity-tracked. Query-like
    /// subscribers get their skeleton stored and their entity references
    /// dependency-tracked; mutation-like subscribers only populate and
    /// refresh entity records. Either way, every record write is skipped when
    /// the stored record is already deeply equal, and one invalidation pass
    /// runs after all writes of this call.
    pub fn ingest(&mut self, subscriber: &Subscriber, data: Option<&Value>) {
        let Some(data) = data else {
            return;
        };
        let schema = subscriber.effective_schema();
        let normalized = match normalize(data, &schema) {
            Ok(normalized) => normalized,
            Err(err) => {
                warn!(subscriber = %subscriber.id, %err, "response not normalizable; skipping entity tracking");
                return;
            }
        };
        let tracked = subscriber.kind.is_tracked();
        if tracked {
            self.subscribers
                .insert(subscriber.id.clone(), subscriber.clone());
            self.skeletons
                .insert(subscriber.id.clone(), normalized.skeleton);
            // The raw response is what the subscriber currently sees; it is
            // the baseline future recomputations are compared against.
            self.delivered.insert(subscriber.id.clone(), data.clone());
        }
        let mut touched = TouchedSet::new();
        for (entity_type, records) in normalized.entities {
            for (id, record) in records {
                if tracked {
                    self.deps
                        .register(&entity_type, id.clone(), subscriber.id.clone());
                }
                if self.table.write(&entity_type, id.clone(), record) {
                    touched.insert(EntityKey {
                        entity_type: entity_type.clone(),
                        id,
                    });
                }
            }
        }
        debug!(subscriber = %subscriber.id, touched = touched.len(), "ingested response");
        self.invalidate(&touched);
    }

    /// Forgets a subscriber and garbage-collects entities only it needed.
    ///
    /// Every dependency bucket the subscriber drained to empty is deleted
    /// together with its entity record. No invalidation runs for those
    /// removals: by construction no dependent subscriber remains.
    pub fn remove_subscriber(&mut self, subscriber: &SubscriberId) {
        self.subscribers.remove(subscriber);
        self.skeletons.remove(subscriber);
        self.delivered.remove(subscriber);
        for key in self.deps.discard_subscriber(subscriber) {
            trace!(entity = %key, "garbage-collecting orphaned entity");
            self.table.remove(&key.entity_type, &key.id);
        }
    }

    /// Clears the entity table, skeletons, and dependency index atomically.
    ///
    /// Invalidation in this design is call-scoped rather than held by a
    /// persistent observer, so nothing can fire against a discarded
    /// generation of storage after the clear.
    pub fn reset(&mut self) {
        debug!("resetting entity cache");
        self.table.clear();
        self.deps.clear();
        self.skeletons.clear();
        self.delivered.clear();
        self.subscribers.clear();
    }

    /// Deletes the entity at `(entity_type, id)`, surgically removing the
    /// reference from every dependent subscriber's skeleton first.
    ///
    /// A skeleton that *is* exactly the deleted id is dropped entirely.
    /// Other skeletons are rewritten through the schema-guided prune, and
    /// only when a removal actually occurred. The entity record is removed
    /// last, after all skeleton rewriting, so the invalidation pass
    /// triggered by the removal denormalizes skeletons already free of the
    /// dangling id. Returns whether the record existed.
    pub fn delete_entity(&mut self, entity_type: &str, id: &EntityId) -> bool {
        let target = id.to_value();
        let dependents: Vec<SubscriberId> = self
            .deps
            .dependents(entity_type, id)
            .map(|subs| subs.iter().cloned().collect())
            .unwrap_or_default();
        if dependents.is_empty() {
            self.deps.remove_bucket(entity_type, id);
        } else {
            for sub_id in dependents {
                let Some(skeleton) = self.skeletons.get(&sub_id) else {
                    continue;
                };
                let schema = self.subscribers.get(&sub_id).map(Subscriber::effective_schema);
                if *skeleton == target
                    && schema.as_ref().is_some_and(|s| references_type(s, entity_type))
                {
                    // The whole response collapses to the deleted reference.
                    self.skeletons.remove(&sub_id);
                    continue;
                }
                let mut modified = false;
                let pruned =
                    prune_entity_ref(skeleton, schema.as_ref(), entity_type, &target, &mut modified);
                if modified {
                    self.skeletons.insert(sub_id, pruned);
                }
            }
        }
        let existed = self.table.remove(entity_type, id);
        if existed {
            debug!(entity_type, %id, "deleted entity");
            let mut touched = TouchedSet::new();
            touched.insert(EntityKey::new(entity_type, id.clone()));
            self.invalidate(&touched);
        }
        existed
    }

    /// Reads the current record at `(entity_type, id)` for a manual edit.
    #[must_use]
    pub fn entity(&self, entity_type: &str, id: &EntityId) -> Option<&Value> {
        self.table.record(entity_type, id)
    }

    /// Replaces the record at `(entity_type, id)` with `update`'s result,
    /// going through the same write-then-invalidate path as any other
    /// mutation. Returns whether the table changed (a deeply-equal
    /// replacement is skipped).
    pub fn update_entity(
        &mut self,
        entity_type: &str,
        id: &EntityId,
        update: impl FnOnce(Option<&Value>) -> Value,
    ) -> bool {
        let next = update(self.table.record(entity_type, id));
        let changed = self.table.write(entity_type, id.clone(), next);
        if changed {
            let mut touched = TouchedSet::new();
            touched.insert(EntityKey::new(entity_type, id.clone()));
            self.invalidate(&touched);
        }
        changed
    }

    /// Applies an out-of-band entity event through the installed mapper.
    ///
    /// Without a mapper (or when the mapper yields nothing) the event is
    /// ignored. Deletions route through [`Self::delete_entity`]; merges
    /// honor the deep-equality write skip unless the mapping forces the
    /// write.
    pub fn process_event(&mut self, event: &EntityEvent) {
        let Some(mapper) = self.event_mapper.as_ref() else {
            warn!(event = %event.id, "no event mapper installed; ignoring entity event");
            return;
        };
        let Some(mapping) = mapper(event) else {
            return;
        };
        if mapping.delete_entity {
            self.delete_entity(&mapping.entity_type, &mapping.id);
            return;
        }
        let changed = if mapping.force_add {
            self.table
                .write_forced(&mapping.entity_type, mapping.id.clone(), mapping.data);
            true
        } else {
            self.table
                .write(&mapping.entity_type, mapping.id.clone(), mapping.data)
        };
        if changed {
            trace!(event = %event.id, entity_type = %mapping.entity_type, id = %mapping.id, "entity event applied");
            let mut touched = TouchedSet::new();
            touched.insert(EntityKey::new(mapping.entity_type, mapping.id));
            self.invalidate(&touched);
        }
    }

    /// Fills a partial skeleton from the entity table ahead of a fetch.
    ///
    /// Returns `None` when there is nothing to preload or when
    /// denormalization adds no information over the input, signaling that a
    /// real fetch is still required.
    #[must_use]
    pub fn preload(&self, schema: &Schema, partial: Option<&Value>, paginated: bool) -> Option<Value> {
        let partial = partial?;
        let effective = effective_schema(schema, paginated);
        let filled = denormalize(partial, &effective, &self.table);
        if filled == *partial {
            return None;
        }
        Some(filled)
    }

    /// One invalidation pass over the table slots touched by this call.
    ///
    /// Dependent subscribers are recomputed at most once per pass even when
    /// several of their entities were touched, and recomputation always reads
    /// the fully updated table. Delivery happens only on actual change.
    fn invalidate(&mut self, touched: &TouchedSet) {
        if touched.is_empty() {
            return;
        }
        let mut recomputed: BTreeSet<SubscriberId> = BTreeSet::new();
        let mut deliveries: Vec<(SubscriberId, Value)> = Vec::new();
        for key in touched {
            let Some(dependents) = self.deps.dependents(&key.entity_type, &key.id) else {
                continue;
            };
            for sub_id in dependents {
                if !recomputed.insert(sub_id.clone()) {
                    continue;
                }
                let Some(subscriber) = self.subscribers.get(sub_id) else {
                    continue;
                };
                let Some(skeleton) = self.skeletons.get(sub_id) else {
                    continue;
                };
                let view = denormalize(skeleton, &subscriber.effective_schema(), &self.table);
                if self.delivered.get(sub_id) != Some(&view) {
                    deliveries.push((sub_id.clone(), view));
                }
            }
        }
        for (sub_id, view) in deliveries {
            trace!(subscriber = %sub_id, "delivering recomputed view");
            self.delivered.insert(sub_id.clone(), view.clone());
            self.port.deliver(&sub_id, &view);
        }
    }
}
