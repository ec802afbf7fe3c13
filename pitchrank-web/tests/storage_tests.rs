use pitchrank_core::{
    AllowAll, BadgeCatalog, DataLoader, NewPlayer, PlayerFeed, RankConfig, RankEngine,
    RankStorage,
};
use pitchrank_web::{MemoryKeyValue, WebDataLoader, WebRankStorage, WebStorageError};
use serde_json::Value;

fn engine() -> RankEngine<WebDataLoader, WebRankStorage<MemoryKeyValue>> {
    let config = WebDataLoader.load_config().unwrap();
    let storage = WebRankStorage::new(MemoryKeyValue::default(), &config);
    RankEngine::new(WebDataLoader, storage).unwrap()
}

#[test]
fn bundled_catalog_matches_builtin() {
    let catalog = WebDataLoader.load_catalog().unwrap();
    assert_eq!(&catalog, BadgeCatalog::standard());
    let config = WebDataLoader.load_config().unwrap();
    assert_eq!(config, RankConfig::default());
}

#[test]
fn missing_keys_read_as_empty() {
    let storage = WebRankStorage::new(MemoryKeyValue::default(), &RankConfig::default());
    assert!(storage.load_players().unwrap().is_empty());
    assert!(storage.load_badges().unwrap().is_empty());
}

#[test]
fn ledger_is_persisted_in_front_end_shape() {
    let engine = engine();
    let player = engine
        .add_player(NewPlayer {
            name: "A".to_string(),
            team_name: "X".to_string(),
            ..NewPlayer::default()
        })
        .unwrap();
    engine.toggle_award(&AllowAll, &player, "mvp").unwrap();

    let raw = engine.storage().store().raw("pitchrank.badges").unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["1"]["mvp"], 1);
    assert_eq!(value["1"]["_playerInfo"]["teamName"], "X");

    let players_raw = engine.storage().store().raw("pitchrank.players").unwrap();
    let players: Value = serde_json::from_str(&players_raw).unwrap();
    assert_eq!(players[0]["teamName"], "X");
    assert_eq!(players[0]["id"], 1);
    assert!(players[0].get("source").is_none());
}

#[test]
fn corrupt_documents_surface_as_errors() {
    let config = RankConfig::default();
    let kv = MemoryKeyValue::default();
    pitchrank_web::KeyValueStore::set_item(&kv, &config.badges_key(), "{not json").unwrap();
    let storage = WebRankStorage::new(kv, &config);
    assert!(matches!(
        storage.load_badges(),
        Err(WebStorageError::Serialization(_))
    ));
}

#[test]
fn clear_removes_both_documents() {
    let engine = engine();
    engine
        .add_player(NewPlayer {
            name: "A".to_string(),
            team_name: "X".to_string(),
            ..NewPlayer::default()
        })
        .unwrap();
    engine.storage().clear().unwrap();
    assert!(engine.roster(&PlayerFeed::empty()).unwrap().is_empty());
}
