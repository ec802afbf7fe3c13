//! localStorage-backed persistence facade
use pitchrank_core::{BadgeLedger, Player, RankConfig, RankStorage};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::dom;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value store with browser `Storage` semantics.
pub trait KeyValueStore {
    /// # Errors
    /// Returns an error if the backing store rejects the read.
    fn get_item(&self, key: &str) -> Result<Option<String>, WebStorageError>;

    /// # Errors
    /// Returns an error if the backing store rejects the write (e.g. quota).
    fn set_item(&self, key: &str, value: &str) -> Result<(), WebStorageError>;

    /// # Errors
    /// Returns an error if the backing store rejects the removal.
    fn remove_item(&self, key: &str) -> Result<(), WebStorageError>;
}

impl KeyValueStore for web_sys::Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, WebStorageError> {
        web_sys::Storage::get_item(self, key)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), WebStorageError> {
        web_sys::Storage::set_item(self, key, value)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), WebStorageError> {
        web_sys::Storage::remove_item(self, key)
            .map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))
    }
}

/// Map-backed store for native tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryKeyValue {
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryKeyValue {
    fn get_item(&self, key: &str) -> Result<Option<String>, WebStorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), WebStorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), WebStorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Rank storage over a key-value store, one JSON document per key.
pub struct WebRankStorage<K = web_sys::Storage> {
    store: K,
    players_key: String,
    badges_key: String,
}

impl<K: KeyValueStore> WebRankStorage<K> {
    #[must_use]
    pub fn new(store: K, config: &RankConfig) -> Self {
        Self {
            store,
            players_key: config.players_key(),
            badges_key: config.badges_key(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &K {
        &self.store
    }

    fn read<T>(&self, key: &str) -> Result<T, WebStorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.get_item(key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(T::default()),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), WebStorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set_item(key, &json)
    }

    /// Drop both persisted documents.
    ///
    /// # Errors
    /// Returns an error if the backing store rejects the removal.
    pub fn clear(&self) -> Result<(), WebStorageError> {
        self.store.remove_item(&self.players_key)?;
        self.store.remove_item(&self.badges_key)
    }
}

impl WebRankStorage<web_sys::Storage> {
    /// Storage bound to the browser's `localStorage`.
    ///
    /// # Errors
    /// Returns an error if `localStorage` is unavailable.
    pub fn local(config: &RankConfig) -> Result<Self, WebStorageError> {
        let storage =
            dom::local_storage().map_err(|e| WebStorageError::Storage(dom::js_error_message(&e)))?;
        Ok(Self::new(storage, config))
    }
}

impl<K: KeyValueStore> RankStorage for WebRankStorage<K> {
    type Error = WebStorageError;

    fn load_players(&self) -> Result<Vec<Player>, Self::Error> {
        self.read(&self.players_key)
    }

    fn save_players(&self, players: &[Player]) -> Result<(), Self::Error> {
        self.write(&self.players_key, players)
    }

    fn load_badges(&self) -> Result<BadgeLedger, Self::Error> {
        self.read(&self.badges_key)
    }

    fn save_badges(&self, ledger: &BadgeLedger) -> Result<(), Self::Error> {
        self.write(&self.badges_key, ledger)
    }
}
