// SPDX-License-Identifier: Apache-2.0

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{get_player_schema, list_players_schema, recording_cache, roster, tennis};
use serde_json::json;
use tessera_core::Subscriber;

#[test]
fn detail_view_preloads_from_an_ingested_list() {
    let (mut cache, _port) = recording_cache();
    let list = Subscriber::query("list", list_players_schema());
    cache.ingest(&list, Some(&json!({ "players": roster() })));

    // A detail query seeded with just the id gets the full record back
    // before its own fetch runs.
    let filled = cache.preload(&get_player_schema(), Some(&json!({ "player": 2 })), false);
    assert_eq!(
        filled,
        Some(json!({ "player": { "id": 2, "rank": 2, "name": "Djokovic", "sport": tennis() } }))
    );
}

#[test]
fn preload_of_an_unknown_id_yields_nothing() {
    let (mut cache, _port) = recording_cache();
    let list = Subscriber::query("list", list_players_schema());
    cache.ingest(&list, Some(&json!({ "players": roster() })));

    assert_eq!(
        cache.preload(&get_player_schema(), Some(&json!({ "player": 99 })), false),
        None
    );
}

#[test]
fn paginated_preload_fills_each_page() {
    let (mut cache, _port) = recording_cache();
    let list = Subscriber::query("list", list_players_schema());
    cache.ingest(&list, Some(&json!({ "players": roster() })));

    let partial = json!({
        "pages": [{ "players": [1, 2] }, { "players": [3] }],
        "pageParams": [1, 2],
    });
    let filled = cache
        .preload(&list_players_schema(), Some(&partial), true)
        .expect("pages should fill from the table");
    assert_eq!(filled["pageParams"], json!([1, 2]));
    let first = filled["pages"][0]["players"].as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["name"], json!("Sinner"));
    assert_eq!(filled["pages"][1]["players"][0]["name"], json!("Alcaraz"));
}

#[test]
fn preload_without_a_seed_is_none() {
    let (cache, _port) = recording_cache();
    assert_eq!(cache.preload(&get_player_schema(), None, false), None);
}
