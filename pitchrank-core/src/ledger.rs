//! Badge ledger: per-player award flags plus a display snapshot
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::player::Player;

/// Denormalized display fields kept alongside a player's awards so the entry
/// can still be rendered after the source record disappears.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub league: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<String>,
}

impl PlayerSnapshot {
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Snapshot holding only a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            team_name: player.team_name.clone(),
            position: player.position.clone(),
            age_group: player.age_group.clone(),
            league: player.league.clone(),
            jersey_number: player.jersey_number.clone(),
        }
    }
}

#[derive(Deserialize)]
struct RawLedgerEntry {
    #[serde(rename = "_playerInfo", default)]
    player_info: Option<PlayerSnapshot>,
    #[serde(flatten)]
    badges: BTreeMap<String, serde_json::Value>,
}

impl From<RawLedgerEntry> for LedgerEntry {
    fn from(raw: RawLedgerEntry) -> Self {
        let badges = raw
            .badges
            .into_iter()
            .filter_map(|(badge_id, value)| match value.as_u64() {
                Some(0) => None,
                Some(_) => Some((badge_id, 1)),
                None => {
                    log::warn!("ignoring non-count value {value} for badge `{badge_id}`");
                    None
                }
            })
            .collect();
        Self {
            badges,
            player_info: raw.player_info,
        }
    }
}

/// Awards for a single player.
///
/// A badge id present in `badges` always maps to a count of exactly 1.
/// Loading clamps larger stored counts to 1, drops zeros and skips values
/// that are not non-negative integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLedgerEntry")]
pub struct LedgerEntry {
    #[serde(flatten)]
    badges: BTreeMap<String, u32>,
    #[serde(rename = "_playerInfo", skip_serializing_if = "Option::is_none")]
    pub player_info: Option<PlayerSnapshot>,
}

impl LedgerEntry {
    #[must_use]
    pub fn count(&self, badge_id: &str) -> u32 {
        self.badges.get(badge_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_badges(&self) -> bool {
        !self.badges.is_empty()
    }

    /// Awarded badge ids with their counts, in id order.
    pub fn badges(&self) -> impl Iterator<Item = (&str, u32)> {
        self.badges.iter().map(|(id, count)| (id.as_str(), *count))
    }
}

/// Outcome of toggling a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwardChange {
    Awarded,
    Revoked,
}

/// All ledger entries keyed by player key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeLedger(BTreeMap<String, LedgerEntry>);

impl BadgeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&LedgerEntry> {
        self.0.get(key)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut LedgerEntry> {
        self.0.get_mut(key)
    }

    /// Count for a player key and badge, zero when absent.
    #[must_use]
    pub fn count(&self, key: &str, badge_id: &str) -> u32 {
        self.0.get(key).map_or(0, |entry| entry.count(badge_id))
    }

    /// Flip a badge for `player`.
    ///
    /// Awarding sets the count to exactly 1; revoking removes the badge id.
    /// The snapshot is refreshed from `player` only when the entry still holds
    /// at least one badge afterwards.
    pub fn toggle_award(
        &mut self,
        player: &Player,
        badge_id: &str,
        key_prefix: &str,
    ) -> AwardChange {
        let key = player.key_with_prefix(key_prefix);
        let entry = self.0.entry(key).or_default();

        let change = if entry.count(badge_id) > 0 {
            entry.badges.remove(badge_id);
            AwardChange::Revoked
        } else {
            entry.badges.insert(badge_id.to_string(), 1);
            AwardChange::Awarded
        };

        if entry.has_badges() {
            entry.player_info = Some(PlayerSnapshot::from(player));
        }
        change
    }

    /// Replace the snapshot on an existing entry. Returns false when the key is unknown.
    pub fn set_snapshot(&mut self, key: &str, snapshot: PlayerSnapshot) -> bool {
        match self.0.get_mut(key) {
            Some(entry) => {
                entry.player_info = Some(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<LedgerEntry> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.0.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
