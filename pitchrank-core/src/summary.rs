//! Per-player badge summaries
//!
//! Summaries are computed in two phases. [`summarize`] is a pure read that
//! also reports which ledger entries are missing a display snapshot that could
//! be recovered from a roster; [`apply_backfill`] is the separate write step.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::badges::{BadgeCatalog, BadgeType};
use crate::ledger::{BadgeLedger, LedgerEntry, PlayerSnapshot};
use crate::player::Player;

/// A catalog badge held by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedBadge {
    pub badge: BadgeType,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub key: String,
    pub player_info: PlayerSnapshot,
    pub badges: SmallVec<[AwardedBadge; 4]>,
    pub total_badges: u32,
}

/// A snapshot recovered from a roster that should be written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillNeed {
    pub key: String,
    pub snapshot: PlayerSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryProjection {
    pub summaries: Vec<PlayerSummary>,
    pub backfill: Vec<BackfillNeed>,
}

/// Build summaries for every ledger entry holding at least one catalog badge.
///
/// Badges without a catalog entry are skipped. Output is ordered by total
/// descending, ties in ledger key order.
#[must_use]
pub fn summarize(
    ledger: &BadgeLedger,
    catalog: &BadgeCatalog,
    local: &[Player],
    feed: &[Player],
    key_prefix: &str,
) -> SummaryProjection {
    let mut projection = SummaryProjection::default();

    for (key, entry) in ledger.iter() {
        let badges: SmallVec<[AwardedBadge; 4]> = catalog
            .iter()
            .filter_map(|badge| {
                let count = entry.count(&badge.id);
                (count > 0).then(|| AwardedBadge {
                    badge: badge.clone(),
                    count,
                })
            })
            .collect();

        let player_info = match resolve_info(key, entry, local, feed, key_prefix) {
            Resolved::Stored(info) => info,
            Resolved::Recovered(info) => {
                if entry.has_badges() {
                    projection.backfill.push(BackfillNeed {
                        key: key.to_string(),
                        snapshot: info.clone(),
                    });
                }
                info
            }
            Resolved::RawKey => PlayerSnapshot::named(key),
        };

        if badges.is_empty() {
            continue;
        }

        let total_badges = badges.iter().map(|b| b.count).sum();
        projection.summaries.push(PlayerSummary {
            key: key.to_string(),
            player_info,
            badges,
            total_badges,
        });
    }

    projection
        .summaries
        .sort_by(|a, b| b.total_badges.cmp(&a.total_badges));
    projection
}

enum Resolved {
    Stored(PlayerSnapshot),
    Recovered(PlayerSnapshot),
    RawKey,
}

fn resolve_info(
    key: &str,
    entry: &LedgerEntry,
    local: &[Player],
    feed: &[Player],
    key_prefix: &str,
) -> Resolved {
    if let Some(info) = entry.player_info.as_ref().filter(|i| i.has_name()) {
        return Resolved::Stored(info.clone());
    }

    let by_id = |players: &[Player], id: u64| -> Option<PlayerSnapshot> {
        players
            .iter()
            .find(|p| p.id == Some(id))
            .map(PlayerSnapshot::from)
    };

    if let Ok(id) = key.parse::<u64>() {
        return by_id(local, id).map_or(Resolved::RawKey, Resolved::Recovered);
    }

    if let Some(id) = key
        .strip_prefix(key_prefix)
        .and_then(|rest| rest.parse::<u64>().ok())
    {
        return by_id(feed, id).map_or(Resolved::RawKey, Resolved::Recovered);
    }

    Resolved::RawKey
}

/// Write recovered snapshots into `ledger`. Returns how many entries changed.
pub fn apply_backfill(ledger: &mut BadgeLedger, needs: &[BackfillNeed]) -> usize {
    let mut changed = 0;
    for need in needs {
        let current = ledger
            .entry(&need.key)
            .and_then(|entry| entry.player_info.as_ref());
        if current == Some(&need.snapshot) {
            continue;
        }
        if ledger.set_snapshot(&need.key, need.snapshot.clone()) {
            changed += 1;
        }
    }
    changed
}
