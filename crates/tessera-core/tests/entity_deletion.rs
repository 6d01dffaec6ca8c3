// SPDX-License-Identifier: Apache-2.0

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{get_player_schema, list_players_schema, player, player_schema, recording_cache};
use serde_json::json;
use tessera_core::Subscriber;
use tessera_schema::EntityId;

#[test]
fn delete_cascades_from_table_to_delivered_view() {
    let (mut cache, port) = recording_cache();
    let q1 = Subscriber::query("q1", get_player_schema());
    cache.ingest(
        &q1,
        Some(&json!({ "player": { "id": 1, "rank": 1, "sport": { "id": 1, "name": "tennis" } } })),
    );

    assert_eq!(
        cache.table().record("player", &EntityId::Int(1)),
        Some(&json!({ "id": 1, "rank": 1, "sport": 1 }))
    );
    assert_eq!(
        cache.table().record("sport", &EntityId::Int(1)),
        Some(&json!({ "id": 1, "name": "tennis" }))
    );
    assert_eq!(cache.skeleton(&q1.id), Some(&json!({ "player": 1 })));

    // Direct rank edit pushes the recomposed response.
    cache.update_entity("player", &EntityId::Int(1), |prev| {
        let mut record = prev.cloned().unwrap_or(json!({}));
        record["rank"] = json!(2);
        record
    });
    assert_eq!(
        port.deliveries_for(&q1.id),
        vec![json!({ "player": { "id": 1, "rank": 2, "sport": { "id": 1, "name": "tennis" } } })]
    );
    port.clear();

    // Deleting the sport empties its table and removes the reference from
    // the next materialized view; the skeleton itself keeps its player
    // reference (same raw id, different entity type).
    assert!(cache.delete_entity("sport", &EntityId::Int(1)));
    assert_eq!(cache.table().len_of("sport"), 0);
    assert_eq!(cache.skeleton(&q1.id), Some(&json!({ "player": 1 })));
    assert_eq!(
        port.deliveries_for(&q1.id),
        vec![json!({ "player": { "id": 1, "rank": 2 } })]
    );
}

#[test]
fn deletion_prunes_paginated_roster_skeletons() {
    let (mut cache, port) = recording_cache();
    let list = Subscriber::paginated_query("list", list_players_schema());
    let page = json!({
        "pages": [{ "players": common::roster(), "page": 2 }],
        "pageParams": [1],
    });
    cache.ingest(&list, Some(&page));

    assert_eq!(
        cache.skeleton(&list.id),
        Some(&json!({
            "pages": [{ "players": [1, 2, 3, 4, 5], "page": 2 }],
            "pageParams": [1],
        }))
    );
    port.clear();

    assert!(cache.delete_entity("player", &EntityId::Int(1)));

    // The skeleton dropped the array element; the carrier fields survive.
    assert_eq!(
        cache.skeleton(&list.id),
        Some(&json!({
            "pages": [{ "players": [2, 3, 4, 5], "page": 2 }],
            "pageParams": [1],
        }))
    );
    assert_eq!(cache.table().len_of("player"), 4);

    // The delivered roster no longer contains the deleted player.
    let deliveries = port.deliveries_for(&list.id);
    assert_eq!(deliveries.len(), 1);
    let players = deliveries[0]["pages"][0]["players"].as_array().unwrap();
    assert_eq!(players.len(), 4);
    assert!(players.iter().all(|p| p["id"] != json!(1)));
}

#[test]
fn deletion_prunes_a_bare_entity_list_response() {
    let (mut cache, port) = recording_cache();
    // The whole response is an entity list, no wrapping object.
    let list = Subscriber::query("list", tessera_schema::Schema::array(player_schema()));
    cache.ingest(
        &list,
        Some(&json!([player(1, 1, "Sinner"), player(2, 2, "Djokovic")])),
    );
    assert_eq!(cache.skeleton(&list.id), Some(&json!([1, 2])));
    port.clear();

    assert!(cache.delete_entity("player", &EntityId::Int(1)));

    assert_eq!(cache.skeleton(&list.id), Some(&json!([2])));
    let deliveries = port.deliveries_for(&list.id);
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0], json!([player(2, 2, "Djokovic")]));
}

#[test]
fn skeleton_collapsing_to_the_deleted_id_is_dropped() {
    let (mut cache, _port) = recording_cache();
    // The whole response *is* a player entity here.
    let q = Subscriber::query("q", player_schema());
    cache.ingest(&q, Some(&player(3, 3, "Alcaraz")));
    assert_eq!(cache.skeleton(&q.id), Some(&json!(3)));

    assert!(cache.delete_entity("player", &EntityId::Int(3)));
    assert!(cache.skeleton(&q.id).is_none());
    assert_eq!(cache.table().len_of("player"), 0);
}

#[test]
fn deleting_an_absent_entity_reports_false() {
    let (mut cache, port) = recording_cache();
    assert!(!cache.delete_entity("player", &EntityId::Int(42)));
    assert_eq!(port.delivery_count(), 0);
}

#[test]
fn unmodified_skeletons_are_not_redelivered() {
    let (mut cache, port) = recording_cache();
    let q1 = Subscriber::query("q1", get_player_schema());
    let q2 = Subscriber::query("q2", get_player_schema());
    cache.ingest(&q1, Some(&json!({ "player": player(1, 1, "Sinner") })));
    cache.ingest(&q2, Some(&json!({ "player": player(2, 2, "Djokovic") })));
    port.clear();

    // player/2 is referenced only by q2; q1's skeleton and view are
    // untouched by the deletion.
    assert!(cache.delete_entity("player", &EntityId::Int(2)));
    assert!(port.deliveries_for(&q1.id).is_empty());
    assert_eq!(cache.skeleton(&q1.id), Some(&json!({ "player": 1 })));
}
