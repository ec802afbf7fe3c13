//! In-memory storage and data loading for tests and tooling
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use crate::badges::BadgeCatalog;
use crate::config::RankConfig;
use crate::ledger::BadgeLedger;
use crate::player::Player;
use crate::{DataLoader, RankStorage};

/// Shared in-memory facade. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    players: Rc<RefCell<Vec<Player>>>,
    badges: Rc<RefCell<BadgeLedger>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn with_players(players: Vec<Player>) -> Self {
        let storage = Self::default();
        *storage.players.borrow_mut() = players;
        storage
    }

    /// Number of `save_*` calls seen so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl RankStorage for MemoryStorage {
    type Error = Infallible;

    fn load_players(&self) -> Result<Vec<Player>, Self::Error> {
        Ok(self.players.borrow().clone())
    }

    fn save_players(&self, players: &[Player]) -> Result<(), Self::Error> {
        *self.players.borrow_mut() = players.to_vec();
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn load_badges(&self) -> Result<BadgeLedger, Self::Error> {
        Ok(self.badges.borrow().clone())
    }

    fn save_badges(&self, ledger: &BadgeLedger) -> Result<(), Self::Error> {
        *self.badges.borrow_mut() = ledger.clone();
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

/// Loader returning the built-in catalog and default configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    pub catalog: Option<BadgeCatalog>,
    pub config: Option<RankConfig>,
}

impl DataLoader for StaticLoader {
    type Error = Infallible;

    fn load_catalog(&self) -> Result<BadgeCatalog, Self::Error> {
        Ok(self.catalog.clone().unwrap_or_default())
    }

    fn load_config(&self) -> Result<RankConfig, Self::Error> {
        Ok(self.config.clone().unwrap_or_default())
    }
}
