#![forbid(unsafe_code)]
//! Browser bindings for PitchRank
//!
//! Provides the localStorage persistence facade, the bundled static data
//! loader and JS-backed collaborators, and exposes the core engine to the
//! front end through `wasm-bindgen`.
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod bindings;
pub mod collaborators;
pub mod dom;
pub mod loader;
pub mod storage;

pub use bindings::PitchRank;
pub use loader::{WebDataError, WebDataLoader};
pub use storage::{KeyValueStore, MemoryKeyValue, WebRankStorage, WebStorageError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if dom::local_storage().is_err() {
        dom::console_error("PitchRank: localStorage unavailable, data will not persist");
    }
}
