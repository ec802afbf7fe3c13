//! PitchRank Core
//!
//! Platform-agnostic ranking logic for the PitchRank youth-soccer platform:
//! the badge ledger, leaderboards, badge summaries and roster merging.
//! Persistence, static data and image hosting are supplied by the host
//! through the traits defined here.

pub mod access;
pub mod badges;
pub mod config;
pub mod error;
pub mod feed;
pub mod filters;
pub mod leaderboard;
pub mod ledger;
pub mod memory;
pub mod merge;
pub mod photo;
pub mod player;
pub mod summary;

use anyhow::Context;

// Re-export commonly used types
pub use access::{AWARD_BADGES, AllowAll, CLAIM_PROFILE, CapabilityCheck, DenyAll};
pub use badges::{BadgeCatalog, BadgeType, CatalogError};
pub use config::RankConfig;
pub use error::EngineError;
pub use feed::{FeedFacets, PlayerFeed};
pub use filters::{FacetFilter, LeaderboardFilters, PlayerFilter};
pub use leaderboard::{LEADERBOARD_SIZE, LeaderboardRow, RankMarker, project_leaderboard};
pub use ledger::{AwardChange, BadgeLedger, LedgerEntry, PlayerSnapshot};
pub use memory::{MemoryStorage, StaticLoader};
pub use merge::merge_players;
pub use photo::{ImageBlob, ImageStore, PhotoRef, store_photo};
pub use player::{
    EXTERNAL_KEY_PREFIX, Gender, NewPlayer, Player, PlayerSource, PlayerValidationError,
};
pub use summary::{
    AwardedBadge, BackfillNeed, PlayerSummary, SummaryProjection, apply_backfill, summarize,
};

/// Trait for abstracting static data loading (badge catalog, configuration).
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the badge catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or is invalid.
    fn load_catalog(&self) -> Result<BadgeCatalog, Self::Error>;

    /// Load ranking configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<RankConfig, Self::Error>;
}

/// Persistence facade over a key-value blob store.
/// Every call reads or writes a whole value; there are no partial updates.
pub trait RankStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the local roster
    ///
    /// # Errors
    ///
    /// Returns an error if the stored roster cannot be read.
    fn load_players(&self) -> Result<Vec<Player>, Self::Error>;

    /// Replace the local roster
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be written.
    fn save_players(&self, players: &[Player]) -> Result<(), Self::Error>;

    /// Load the badge ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the stored ledger cannot be read.
    fn load_badges(&self) -> Result<BadgeLedger, Self::Error>;

    /// Replace the badge ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be written.
    fn save_badges(&self, ledger: &BadgeLedger) -> Result<(), Self::Error>;
}

type EngineResult<T, S> = Result<T, EngineError<<S as RankStorage>::Error>>;

/// Main engine tying the derivations to injected storage and static data
pub struct RankEngine<L, S>
where
    L: DataLoader,
    S: RankStorage,
{
    data_loader: L,
    storage: S,
    catalog: BadgeCatalog,
    config: RankConfig,
}

impl<L, S> RankEngine<L, S>
where
    L: DataLoader,
    S: RankStorage,
{
    /// Create an engine, loading the catalog and configuration up front
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or configuration cannot be loaded.
    pub fn new(data_loader: L, storage: S) -> anyhow::Result<Self> {
        let catalog = data_loader
            .load_catalog()
            .context("loading badge catalog")?;
        let config = data_loader
            .load_config()
            .context("loading rank configuration")?;
        Ok(Self {
            data_loader,
            storage,
            catalog,
            config,
        })
    }

    /// Re-read the catalog and configuration from the data loader
    ///
    /// # Errors
    ///
    /// Returns an error if either cannot be loaded; the current values are kept.
    pub fn reload(&mut self) -> anyhow::Result<()> {
        let catalog = self
            .data_loader
            .load_catalog()
            .context("reloading badge catalog")?;
        let config = self
            .data_loader
            .load_config()
            .context("reloading rank configuration")?;
        self.catalog = catalog;
        self.config = config;
        Ok(())
    }

    pub const fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    pub const fn config(&self) -> &RankConfig {
        &self.config
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn key_prefix(&self) -> &str {
        &self.config.external_key_prefix
    }

    /// Ledger key for `player` under the configured prefix
    #[must_use]
    pub fn player_key(&self, player: &Player) -> String {
        player.key_with_prefix(self.key_prefix())
    }

    /// Stored local players
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read.
    pub fn local_players(&self) -> Result<Vec<Player>, S::Error> {
        self.storage.load_players()
    }

    /// Stored badge ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    pub fn ledger(&self) -> Result<BadgeLedger, S::Error> {
        self.storage.load_badges()
    }

    /// Validate and store a manually entered player
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the roster cannot be saved.
    pub fn add_player(&self, entry: NewPlayer) -> EngineResult<Player, S> {
        let mut players = self.storage.load_players().map_err(EngineError::storage)?;
        let player = entry.into_player(player::next_player_id(&players))?;
        players.push(player.clone());
        self.storage
            .save_players(&players)
            .map_err(EngineError::storage)?;
        log::debug!(
            "added local player {} ({})",
            player.name,
            self.player_key(&player)
        );
        Ok(player)
    }

    /// Remove a local player. Their ledger entry stays so awards remain
    /// visible through its snapshot. Returns false when no player matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read or saved.
    pub fn delete_player(&self, id: u64) -> Result<bool, S::Error> {
        let mut players = self.storage.load_players()?;
        let before = players.len();
        players.retain(|p| p.id != Some(id));
        if players.len() == before {
            return Ok(false);
        }
        self.storage.save_players(&players)?;
        Ok(true)
    }

    /// Local players merged with the feed
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read.
    pub fn roster(&self, feed: &PlayerFeed) -> Result<Vec<Player>, S::Error> {
        let local = self.storage.load_players()?;
        Ok(merge_players(&local, feed.players()))
    }

    /// Merged roster narrowed by `filter`
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read.
    pub fn search(
        &self,
        feed: &PlayerFeed,
        filter: &PlayerFilter,
    ) -> Result<Vec<Player>, S::Error> {
        let mut roster = self.roster(feed)?;
        roster.retain(|p| filter.matches(p));
        Ok(roster)
    }

    /// Award or revoke `badge_id` for `player` and persist the ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the caller lacks [`AWARD_BADGES`], the badge is not
    /// in the catalog, or the ledger cannot be read or saved.
    pub fn toggle_award(
        &self,
        caps: &impl CapabilityCheck,
        player: &Player,
        badge_id: &str,
    ) -> EngineResult<AwardChange, S> {
        if !caps.can_perform(AWARD_BADGES) {
            return Err(EngineError::Forbidden(AWARD_BADGES));
        }
        if !self.catalog.contains(badge_id) {
            return Err(EngineError::UnknownBadge(badge_id.to_string()));
        }
        let mut ledger = self.storage.load_badges().map_err(EngineError::storage)?;
        let change = ledger.toggle_award(player, badge_id, self.key_prefix());
        self.storage
            .save_badges(&ledger)
            .map_err(EngineError::storage)?;
        log::debug!(
            "{change:?} {badge_id} for {}",
            player.key_with_prefix(self.key_prefix())
        );
        Ok(change)
    }

    /// Top players for one badge over the merged roster
    ///
    /// # Errors
    ///
    /// Returns an error if the roster or ledger cannot be read.
    pub fn leaderboard(
        &self,
        feed: &PlayerFeed,
        badge_id: &str,
        filters: &LeaderboardFilters,
    ) -> Result<Vec<LeaderboardRow>, S::Error> {
        let roster = self.roster(feed)?;
        let ledger = self.storage.load_badges()?;
        Ok(project_leaderboard(
            &roster,
            &ledger,
            badge_id,
            filters,
            self.key_prefix(),
            self.config.leaderboard_size,
        ))
    }

    /// Badge summaries for every player holding a catalog badge. Read only.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster or ledger cannot be read.
    pub fn summaries(&self, feed: &PlayerFeed) -> Result<SummaryProjection, S::Error> {
        let ledger = self.storage.load_badges()?;
        let local = self.storage.load_players()?;
        Ok(summarize(
            &ledger,
            &self.catalog,
            &local,
            feed.players(),
            self.key_prefix(),
        ))
    }

    /// Write recoverable snapshots into the ledger. Persists only when
    /// something changed and returns the number of entries updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger or roster cannot be read, or the ledger
    /// cannot be saved.
    pub fn backfill_snapshots(&self, feed: &PlayerFeed) -> Result<usize, S::Error> {
        let mut ledger = self.storage.load_badges()?;
        let local = self.storage.load_players()?;
        let projection = summarize(
            &ledger,
            &self.catalog,
            &local,
            feed.players(),
            self.key_prefix(),
        );
        let changed = apply_backfill(&mut ledger, &projection.backfill);
        if changed > 0 {
            self.storage.save_badges(&ledger)?;
            log::debug!("backfilled {changed} ledger snapshots");
        }
        Ok(changed)
    }

    /// Claim a local player's profile for `owner_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the caller lacks [`CLAIM_PROFILE`], the player does
    /// not exist, someone else already claimed it, or the roster cannot be saved.
    pub fn claim_profile(
        &self,
        caps: &impl CapabilityCheck,
        player_id: u64,
        owner_id: &str,
    ) -> EngineResult<Player, S> {
        if !caps.can_perform(CLAIM_PROFILE) {
            return Err(EngineError::Forbidden(CLAIM_PROFILE));
        }
        let mut players = self.storage.load_players().map_err(EngineError::storage)?;
        let player = players
            .iter_mut()
            .find(|p| p.id == Some(player_id))
            .ok_or(EngineError::UnknownPlayer(player_id))?;

        if let Some(owner) = player.claimed_by.as_deref() {
            if owner == owner_id {
                return Ok(player.clone());
            }
            return Err(EngineError::AlreadyClaimed { player_id });
        }
        player.claimed_by = Some(owner_id.to_string());
        let claimed = player.clone();
        self.storage
            .save_players(&players)
            .map_err(EngineError::storage)?;
        Ok(claimed)
    }

    /// Store a photo for a local player and record its reference
    ///
    /// # Errors
    ///
    /// Returns an error if the player does not exist or the roster cannot be
    /// read or saved. Upload failures fall back to an inline photo.
    pub async fn attach_photo<I: ImageStore>(
        &self,
        images: &I,
        owner_id: &str,
        player_id: u64,
        blob: &ImageBlob,
    ) -> EngineResult<PhotoRef, S> {
        let players = self.storage.load_players().map_err(EngineError::storage)?;
        let target = players
            .iter()
            .find(|p| p.id == Some(player_id))
            .map(|p| self.player_key(p))
            .ok_or(EngineError::UnknownPlayer(player_id))?;

        let photo = store_photo(images, owner_id, &target, blob).await;

        // Re-read: the roster may have changed while the upload was in flight.
        let mut players = self.storage.load_players().map_err(EngineError::storage)?;
        let player = players
            .iter_mut()
            .find(|p| p.id == Some(player_id))
            .ok_or(EngineError::UnknownPlayer(player_id))?;
        player.photo_url = Some(photo.url().to_string());
        self.storage
            .save_players(&players)
            .map_err(EngineError::storage)?;
        Ok(photo)
    }

    /// Delete a player's hosted photo and clear the reference
    ///
    /// # Errors
    ///
    /// Returns an error if the player does not exist or the roster cannot be
    /// read or saved. Image store failures are logged and ignored.
    pub async fn detach_photo<I: ImageStore>(
        &self,
        images: &I,
        owner_id: &str,
        player_id: u64,
    ) -> EngineResult<(), S> {
        let players = self.storage.load_players().map_err(EngineError::storage)?;
        let player = players
            .iter()
            .find(|p| p.id == Some(player_id))
            .ok_or(EngineError::UnknownPlayer(player_id))?;
        let hosted = player
            .photo_url
            .as_deref()
            .is_some_and(|url| !url.starts_with("data:"));
        let target = self.player_key(player);

        if hosted
            && images.is_configured()
            && let Err(err) = images.delete_image(owner_id, &target).await
        {
            log::warn!("could not delete hosted photo for {target}: {err}");
        }

        let mut players = self.storage.load_players().map_err(EngineError::storage)?;
        if let Some(player) = players.iter_mut().find(|p| p.id == Some(player_id)) {
            player.photo_url = None;
        }
        self.storage
            .save_players(&players)
            .map_err(EngineError::storage)?;
        Ok(())
    }
}
