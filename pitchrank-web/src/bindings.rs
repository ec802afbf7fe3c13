//! JSON-in/JSON-out surface consumed by the front end
use js_sys::{Function, Promise};
use pitchrank_core::{
    BadgeCatalog, ImageBlob, LeaderboardFilters, NewPlayer, Player, PlayerFeed, PlayerFilter,
    RankEngine,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::collaborators::{JsCapabilities, JsImageStore};
use crate::loader::WebDataLoader;
use crate::storage::WebRankStorage;

type WebEngine = RankEngine<WebDataLoader, WebRankStorage>;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn feed_from_js(value: JsValue) -> Result<PlayerFeed, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(PlayerFeed::empty());
    }
    from_js(value)
}

/// Player ids cross the JS boundary as numbers.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn player_id(raw: f64) -> Result<u64, JsError> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= 2f64.powi(53) {
        Ok(raw as u64)
    } else {
        Err(JsError::new(&format!("invalid player id: {raw}")))
    }
}

/// Engine handle exposed to JavaScript.
#[wasm_bindgen]
pub struct PitchRank {
    engine: Rc<WebEngine>,
}

#[wasm_bindgen]
impl PitchRank {
    /// Create an engine over the browser's `localStorage`.
    ///
    /// # Errors
    /// Fails if the bundled data is invalid or `localStorage` is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<PitchRank, JsError> {
        let config = pitchrank_core::DataLoader::load_config(&WebDataLoader)?;
        let storage = WebRankStorage::local(&config)?;
        let engine = RankEngine::new(WebDataLoader, storage)
            .map_err(|err| JsError::new(&format!("{err:#}")))?;
        Ok(Self {
            engine: Rc::new(engine),
        })
    }

    /// # Errors
    /// Fails if the catalog cannot be serialized.
    pub fn catalog(&self) -> Result<JsValue, JsError> {
        let catalog: &BadgeCatalog = self.engine.catalog();
        to_js(catalog)
    }

    /// # Errors
    /// Fails if stored players cannot be read.
    #[wasm_bindgen(js_name = localPlayers)]
    pub fn local_players(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.local_players()?)
    }

    /// # Errors
    /// Fails on validation or when the roster cannot be saved.
    #[wasm_bindgen(js_name = addPlayer)]
    pub fn add_player(&self, entry: JsValue) -> Result<JsValue, JsError> {
        let entry: NewPlayer = from_js(entry)?;
        to_js(&self.engine.add_player(entry)?)
    }

    /// # Errors
    /// Fails when the id is invalid or the roster cannot be saved.
    #[wasm_bindgen(js_name = deletePlayer)]
    pub fn delete_player(&self, id: f64) -> Result<bool, JsError> {
        Ok(self.engine.delete_player(player_id(id)?)?)
    }

    /// # Errors
    /// Fails if the feed cannot be parsed or storage cannot be read.
    pub fn roster(&self, feed: JsValue) -> Result<JsValue, JsError> {
        to_js(&self.engine.roster(&feed_from_js(feed)?)?)
    }

    /// # Errors
    /// Fails if inputs cannot be parsed or storage cannot be read.
    pub fn search(&self, feed: JsValue, filter: JsValue) -> Result<JsValue, JsError> {
        let filter: PlayerFilter = from_js(filter)?;
        to_js(&self.engine.search(&feed_from_js(feed)?, &filter)?)
    }

    /// # Errors
    /// Fails if the feed cannot be parsed.
    pub fn facets(&self, feed: JsValue) -> Result<JsValue, JsError> {
        to_js(&feed_from_js(feed)?.facets())
    }

    /// Returns `"awarded"` or `"revoked"`. Pass players as returned by
    /// `roster` or `leaderboard`; feed rows carry `source: "feed"` and a
    /// player without it is treated as local.
    ///
    /// # Errors
    /// Fails without the capability, for unknown badges, or on storage errors.
    #[wasm_bindgen(js_name = toggleAward)]
    pub fn toggle_award(
        &self,
        can_perform: Function,
        player: JsValue,
        badge_id: &str,
    ) -> Result<JsValue, JsError> {
        let player: Player = from_js(player)?;
        let caps = JsCapabilities::new(can_perform);
        to_js(&self.engine.toggle_award(&caps, &player, badge_id)?)
    }

    /// # Errors
    /// Fails if inputs cannot be parsed or storage cannot be read.
    pub fn leaderboard(
        &self,
        feed: JsValue,
        badge_id: &str,
        filters: JsValue,
    ) -> Result<JsValue, JsError> {
        let filters: LeaderboardFilters = if filters.is_undefined() || filters.is_null() {
            LeaderboardFilters::default()
        } else {
            from_js(filters)?
        };
        to_js(
            &self
                .engine
                .leaderboard(&feed_from_js(feed)?, badge_id, &filters)?,
        )
    }

    /// Read-only summaries; pending snapshot backfills are reported, not written.
    ///
    /// # Errors
    /// Fails if the feed cannot be parsed or storage cannot be read.
    pub fn summaries(&self, feed: JsValue) -> Result<JsValue, JsError> {
        to_js(&self.engine.summaries(&feed_from_js(feed)?)?)
    }

    /// # Errors
    /// Fails if the feed cannot be parsed or the ledger cannot be saved.
    #[wasm_bindgen(js_name = backfillSnapshots)]
    pub fn backfill_snapshots(&self, feed: JsValue) -> Result<usize, JsError> {
        Ok(self.engine.backfill_snapshots(&feed_from_js(feed)?)?)
    }

    /// # Errors
    /// Fails without the capability, for unknown or already-claimed profiles.
    #[wasm_bindgen(js_name = claimProfile)]
    pub fn claim_profile(
        &self,
        can_perform: Function,
        player_id_raw: f64,
        owner_id: &str,
    ) -> Result<JsValue, JsError> {
        let caps = JsCapabilities::new(can_perform);
        to_js(
            &self
                .engine
                .claim_profile(&caps, player_id(player_id_raw)?, owner_id)?,
        )
    }

    /// Upload a player photo; resolves to `{kind, url}`.
    #[wasm_bindgen(js_name = attachPhoto)]
    pub fn attach_photo(
        &self,
        images: JsValue,
        owner_id: String,
        player_id_raw: f64,
        mime: String,
        bytes: Vec<u8>,
    ) -> Promise {
        let engine = Rc::clone(&self.engine);
        future_to_promise(async move {
            let id = player_id(player_id_raw)?;
            let store = JsImageStore::new(images);
            let blob = ImageBlob::new(mime, bytes);
            let photo = engine
                .attach_photo(&store, &owner_id, id, &blob)
                .await
                .map_err(JsError::from)?;
            Ok(to_js(&photo)?)
        })
    }

    /// Remove a player photo; resolves to `undefined`.
    #[wasm_bindgen(js_name = detachPhoto)]
    pub fn detach_photo(&self, images: JsValue, owner_id: String, player_id_raw: f64) -> Promise {
        let engine = Rc::clone(&self.engine);
        future_to_promise(async move {
            let id = player_id(player_id_raw)?;
            let store = JsImageStore::new(images);
            engine
                .detach_photo(&store, &owner_id, id)
                .await
                .map_err(JsError::from)?;
            Ok(JsValue::UNDEFINED)
        })
    }
}
