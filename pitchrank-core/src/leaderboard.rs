//! Per-badge leaderboard projection
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filters::LeaderboardFilters;
use crate::ledger::BadgeLedger;
use crate::player::Player;

/// Default number of rows on a leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Podium marker shown next to a leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMarker {
    Gold,
    Silver,
    Bronze,
    Number(usize),
}

impl RankMarker {
    /// Marker for a 1-based position.
    #[must_use]
    pub const fn for_position(position: usize) -> Self {
        match position {
            1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            n => Self::Number(n),
        }
    }
}

impl fmt::Display for RankMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankMarker::Gold => write!(f, "🥇"),
            RankMarker::Silver => write!(f, "🥈"),
            RankMarker::Bronze => write!(f, "🥉"),
            RankMarker::Number(n) => write!(f, "#{n}"),
        }
    }
}

/// One ranked player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub marker: RankMarker,
    pub player: Player,
    pub badge_count: u32,
}

/// Rank `players` by how many of `badge_id` they hold.
///
/// Players failing `filters` or holding none of the badge are dropped. The
/// sort is stable, so ties keep roster order. At most `limit` rows come back.
#[must_use]
pub fn project_leaderboard(
    players: &[Player],
    ledger: &BadgeLedger,
    badge_id: &str,
    filters: &LeaderboardFilters,
    key_prefix: &str,
    limit: usize,
) -> Vec<LeaderboardRow> {
    let mut ranked: Vec<(&Player, u32)> = players
        .iter()
        .filter(|p| filters.matches(p))
        .map(|p| (p, ledger.count(&p.key_with_prefix(key_prefix), badge_id)))
        .filter(|(_, count)| *count > 0)
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (player, badge_count))| LeaderboardRow {
            rank: idx + 1,
            marker: RankMarker::for_position(idx + 1),
            player: player.clone(),
            badge_count,
        })
        .collect()
}
