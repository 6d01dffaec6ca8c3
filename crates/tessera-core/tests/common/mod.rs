// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use tessera_core::{EntityCache, SubscriberId, SubscriberPort};
use tessera_schema::{EntitySchema, Schema};

/// Delivery port that records every push so tests can assert on exactly what
/// left the cache (and, as importantly, on what did not).
#[derive(Default, Clone)]
pub struct RecordingPort {
    log: Rc<RefCell<Vec<(SubscriberId, Value)>>>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far, in order.
    pub fn deliveries(&self) -> Vec<(SubscriberId, Value)> {
        self.log.borrow().clone()
    }

    /// Deliveries addressed to one subscriber.
    pub fn deliveries_for(&self, id: &SubscriberId) -> Vec<Value> {
        self.log
            .borrow()
            .iter()
            .filter(|(sub, _)| sub == id)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn delivery_count(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl SubscriberPort for RecordingPort {
    fn deliver(&mut self, subscriber: &SubscriberId, view: &Value) {
        self.log
            .borrow_mut()
            .push((subscriber.clone(), view.clone()));
    }
}

/// A cache plus a handle onto its recording port.
pub fn recording_cache() -> (EntityCache<RecordingPort>, RecordingPort) {
    let port = RecordingPort::new();
    (EntityCache::new(port.clone()), port)
}

pub fn sport_schema() -> Schema {
    EntitySchema::new("sport").into()
}

pub fn player_schema() -> Schema {
    EntitySchema::new("player")
        .field("sport", sport_schema())
        .into()
}

/// Response shape of a single-player fetch: `{ "player": <player> }`.
pub fn get_player_schema() -> Schema {
    Schema::object([("player", player_schema())])
}

/// Response shape of one roster page: `{ "players": [<player>], "page": n }`.
pub fn list_players_schema() -> Schema {
    Schema::object([("players", Schema::array(player_schema()))])
}

pub fn tennis() -> Value {
    json!({ "id": 1, "name": "tennis" })
}

pub fn player(id: i64, rank: i64, name: &str) -> Value {
    json!({
        "id": id,
        "rank": rank,
        "name": name,
        "sport": tennis(),
    })
}

/// The fixture roster, ranks matching ids.
pub fn roster() -> Vec<Value> {
    vec![
        player(1, 1, "Sinner"),
        player(2, 2, "Djokovic"),
        player(3, 3, "Alcaraz"),
        player(4, 4, "Zverev"),
        player(5, 5, "Medvedev"),
    ]
}
