#![cfg(target_arch = "wasm32")]
use js_sys::{Function, Reflect};
use pitchrank_core::{RankConfig, RankStorage};
use pitchrank_web::{PitchRank, WebRankStorage, dom};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn fresh_engine() -> PitchRank {
    let storage = WebRankStorage::local(&RankConfig::default()).expect("local storage");
    storage.clear().expect("clear storage");
    PitchRank::new().expect("engine")
}

fn add(engine: &PitchRank, name: &str, team: &str) -> JsValue {
    let entry = serde_wasm_bindgen::to_value(&serde_json::json!({
        "name": name,
        "teamName": team,
        "ageGroup": "g13",
    }))
    .expect("entry");
    engine.add_player(entry).map_err(JsValue::from).expect("add player")
}

fn allow_all() -> Function {
    Function::new_with_args("name", "return true;")
}

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).expect("property")
}

#[wasm_bindgen_test]
fn local_storage_is_available() {
    assert!(dom::local_storage().is_ok());
}

#[wasm_bindgen_test]
fn added_players_are_persisted_to_local_storage() {
    let engine = fresh_engine();
    let player = add(&engine, "Ana", "Storm");
    assert_eq!(get(&player, "ageGroup").as_string().as_deref(), Some("G13"));

    let storage = WebRankStorage::local(&RankConfig::default()).expect("local storage");
    let stored = storage.load_players().expect("players");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].team_name, "Storm");
}

#[wasm_bindgen_test]
fn toggle_award_feeds_the_leaderboard() {
    let engine = fresh_engine();
    let player = add(&engine, "Ana", "Storm");

    let change = engine
        .toggle_award(allow_all(), player.clone(), "mvp")
        .map_err(JsValue::from)
        .expect("toggle");
    assert_eq!(change.as_string().as_deref(), Some("awarded"));

    let rows = engine
        .leaderboard(JsValue::UNDEFINED, "mvp", JsValue::UNDEFINED)
        .map_err(JsValue::from)
        .expect("leaderboard");
    let rows = js_sys::Array::from(&rows);
    assert_eq!(rows.length(), 1);
    assert_eq!(get(&rows.get(0), "badgeCount").as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn denied_capability_rejects_the_toggle() {
    let engine = fresh_engine();
    let player = add(&engine, "Ana", "Storm");
    let deny = Function::new_with_args("name", "return false;");
    assert!(engine.toggle_award(deny, player, "mvp").is_err());
}

#[wasm_bindgen_test]
fn feed_row_with_a_local_id_keeps_its_own_entry() {
    let engine = fresh_engine();
    let ana = add(&engine, "Ana", "Storm");
    let feed = serde_wasm_bindgen::to_value(&serde_json::json!([
        {"id": 1, "name": "Bea", "teamName": "Fire", "ageGroup": "G13"}
    ]))
    .expect("feed");

    engine
        .toggle_award(allow_all(), ana, "mvp")
        .map_err(JsValue::from)
        .expect("toggle");

    let rows = engine
        .leaderboard(feed, "mvp", JsValue::UNDEFINED)
        .map_err(JsValue::from)
        .expect("leaderboard");
    let rows = js_sys::Array::from(&rows);
    assert_eq!(rows.length(), 1);
    let player = get(&rows.get(0), "player");
    assert_eq!(get(&player, "name").as_string().as_deref(), Some("Ana"));
}
