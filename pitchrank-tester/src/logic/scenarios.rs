//! Ranking properties checked against seeded synthetic rosters
use anyhow::{Result, bail, ensure};
use pitchrank_core::{
    AllowAll, BadgeLedger, FacetFilter, LeaderboardFilters, MemoryStorage, Player, PlayerSource,
    RankEngine, RankStorage, StaticLoader,
};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::roster::SyntheticRoster;

type Engine = RankEngine<StaticLoader, MemoryStorage>;

pub struct TestScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub test_fn: fn(&SyntheticRoster, &mut ChaCha20Rng) -> Result<()>,
}

const SCENARIOS: &[TestScenario] = &[
    TestScenario {
        name: "smoke",
        description: "Award, rank and summarize a single local player",
        test_fn: smoke,
    },
    TestScenario {
        name: "toggle-involution",
        description: "Toggling a badge twice restores the player's badge counts",
        test_fn: toggle_involution,
    },
    TestScenario {
        name: "award-idempotence",
        description: "Stored counts are always exactly 1 and follow toggle parity",
        test_fn: award_idempotence,
    },
    TestScenario {
        name: "leaderboard-bounds",
        description: "Leaderboards are bounded, sorted and free of zero counts for every filter",
        test_fn: leaderboard_bounds,
    },
    TestScenario {
        name: "summary-totals",
        description: "Summary totals count catalog badges only and skip empty entries",
        test_fn: summary_totals,
    },
    TestScenario {
        name: "merge-uniqueness",
        description: "Merged rosters have unique keys and keep local players",
        test_fn: merge_uniqueness,
    },
    TestScenario {
        name: "source-isolation",
        description: "Local and feed players sharing an id never share awards",
        test_fn: source_isolation,
    },
    TestScenario {
        name: "backfill-explicit",
        description: "Summaries never write; backfill persists recoverable snapshots once",
        test_fn: backfill_explicit,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.name, s.description))
}

pub fn get_scenario(name: &str) -> Option<&'static TestScenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

pub fn all_scenario_names() -> Vec<String> {
    SCENARIOS.iter().map(|s| s.name.to_string()).collect()
}

fn engine_for(roster: &SyntheticRoster) -> Result<Engine> {
    RankEngine::new(
        StaticLoader::default(),
        MemoryStorage::with_players(roster.local.clone()),
    )
}

fn random_badge(engine: &Engine, rng: &mut ChaCha20Rng) -> String {
    let ids: Vec<&str> = engine.catalog().iter().map(|b| b.id.as_str()).collect();
    ids.choose(rng).copied().unwrap_or("mvp").to_string()
}

/// Apply a burst of random toggles over everyone in the roster.
fn scatter_awards(engine: &Engine, roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let everyone: Vec<&Player> = roster.everyone().collect();
    if everyone.is_empty() {
        return Ok(());
    }
    let toggles = rng.gen_range(0..everyone.len() * 4);
    for _ in 0..toggles {
        let player = everyone[rng.gen_range(0..everyone.len())];
        let badge = random_badge(engine, rng);
        engine.toggle_award(&AllowAll, player, &badge)?;
    }
    Ok(())
}

fn badge_counts(ledger: &BadgeLedger, key: &str) -> BTreeMap<String, u32> {
    ledger
        .entry(key)
        .map(|entry| {
            entry
                .badges()
                .map(|(id, count)| (id.to_string(), count))
                .collect()
        })
        .unwrap_or_default()
}

fn smoke(roster: &SyntheticRoster, _rng: &mut ChaCha20Rng) -> Result<()> {
    let Some(player) = roster.local.first() else {
        return Ok(());
    };
    let engine = engine_for(roster)?;
    engine.toggle_award(&AllowAll, player, "mvp")?;
    let rows = engine.leaderboard(&roster.feed, "mvp", &LeaderboardFilters::default())?;
    ensure!(rows.len() == 1, "expected one leaderboard row, got {}", rows.len());
    ensure!(rows[0].player == *player, "wrong player on the leaderboard");
    let projection = engine.summaries(&roster.feed)?;
    ensure!(
        projection.summaries.len() == 1 && projection.summaries[0].total_badges == 1,
        "expected a single summary with one badge"
    );
    Ok(())
}

fn toggle_involution(roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    scatter_awards(&engine, roster, rng)?;
    for player in roster.everyone() {
        let badge = random_badge(&engine, rng);
        let key = engine.player_key(player);
        let before = badge_counts(&engine.ledger()?, &key);
        engine.toggle_award(&AllowAll, player, &badge)?;
        engine.toggle_award(&AllowAll, player, &badge)?;
        let after = badge_counts(&engine.ledger()?, &key);
        ensure!(
            before == after,
            "double toggle of {badge} changed {key}: {before:?} -> {after:?}"
        );
    }
    Ok(())
}

fn award_idempotence(roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    scatter_awards(&engine, roster, rng)?;
    for (key, entry) in engine.ledger()?.iter() {
        if let Some((badge, count)) = entry.badges().find(|&(_, count)| count != 1) {
            bail!("{key} holds {badge} x{count}");
        }
    }

    let Some(player) = roster.local.first() else {
        return Ok(());
    };
    let key = engine.player_key(player);
    let badge = random_badge(&engine, rng);
    let start = engine.ledger()?.count(&key, &badge);
    let toggles = rng.gen_range(1..=7_u32);
    for _ in 0..toggles {
        engine.toggle_award(&AllowAll, player, &badge)?;
    }
    let expected = (start + toggles) % 2;
    let actual = engine.ledger()?.count(&key, &badge);
    ensure!(
        actual == expected,
        "{toggles} toggles from {start} left {badge} at {actual}, expected {expected}"
    );
    Ok(())
}

fn facet_choices(values: impl Iterator<Item = String>) -> Vec<FacetFilter> {
    let distinct: BTreeSet<String> = values.collect();
    let mut choices = vec![FacetFilter::All, FacetFilter::only("NOWHERE")];
    choices.extend(distinct.into_iter().map(FacetFilter::only));
    choices
}

fn leaderboard_bounds(roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    scatter_awards(&engine, roster, rng)?;
    let limit = engine.config().leaderboard_size;
    let ages = facet_choices(roster.everyone().map(|p| p.age_group.clone()));
    let leagues = facet_choices(roster.everyone().map(|p| p.league.clone()));
    let states = facet_choices(roster.everyone().map(|p| p.state.clone()));

    for badge in engine.catalog().iter() {
        for age_group in &ages {
            for league in &leagues {
                let filters = LeaderboardFilters {
                    age_group: age_group.clone(),
                    league: league.clone(),
                    state: states.choose(rng).cloned().unwrap_or_default(),
                };
                let rows = engine.leaderboard(&roster.feed, &badge.id, &filters)?;
                ensure!(rows.len() <= limit, "{} rows for {}", rows.len(), badge.id);
                ensure!(
                    rows.windows(2).all(|w| w[0].badge_count >= w[1].badge_count),
                    "{} leaderboard is not sorted",
                    badge.id
                );
                if let Some(row) = rows.iter().find(|r| r.badge_count == 0) {
                    bail!("{} listed with zero {}", row.player.name, badge.id);
                }
                if let Some(row) = rows.iter().find(|r| !filters.matches(&r.player)) {
                    bail!("{} does not match {filters:?}", row.player.name);
                }
            }
        }
    }

    let unknown = engine.leaderboard(&roster.feed, "retired_badge", &LeaderboardFilters::default())?;
    ensure!(unknown.is_empty(), "unknown badge produced a leaderboard");
    Ok(())
}

fn summary_totals(roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    scatter_awards(&engine, roster, rng)?;

    // Orphaned badge ids must stay invisible.
    let mut raw: Map<String, Value> = serde_json::from_value(serde_json::to_value(engine.ledger()?)?)?;
    raw.insert("ghost_team".to_string(), json!({ "retired_badge": 1 }));
    if let Some(Value::Object(entry)) = raw.values_mut().next() {
        entry.insert("retired_badge".to_string(), json!(1));
    }
    let ledger: BadgeLedger = serde_json::from_value(Value::Object(raw))?;
    engine.storage().save_badges(&ledger)?;

    let projection = engine.summaries(&roster.feed)?;
    for summary in &projection.summaries {
        let expected: u32 = badge_counts(&ledger, &summary.key)
            .iter()
            .filter(|(id, _)| engine.catalog().contains(id))
            .map(|(_, count)| count)
            .sum();
        ensure!(
            summary.total_badges == expected,
            "{} totals {} but holds {expected} catalog badges",
            summary.key,
            summary.total_badges
        );
        ensure!(!summary.badges.is_empty(), "{} listed with no badges", summary.key);
        ensure!(
            summary.badges.iter().all(|b| b.badge.id != "retired_badge"),
            "{} shows an orphaned badge",
            summary.key
        );
    }
    ensure!(
        projection.summaries.iter().all(|s| s.key != "ghost_team"),
        "entry with only orphaned badges was summarized"
    );
    ensure!(
        projection
            .summaries
            .windows(2)
            .all(|w| w[0].total_badges >= w[1].total_badges),
        "summaries are not sorted by total"
    );
    Ok(())
}

fn merge_uniqueness(roster: &SyntheticRoster, _rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    let merged = engine.roster(&roster.feed)?;

    // Local rows are kept verbatim, so only feed rows must bring new keys.
    let mut seen: HashSet<String> = roster.local.iter().map(Player::merge_key).collect();
    for player in &merged[roster.local.len()..] {
        ensure!(
            seen.insert(player.merge_key()),
            "feed row duplicates merge key {}",
            player.merge_key()
        );
    }
    ensure!(
        merged[..roster.local.len()] == roster.local[..],
        "local players were not kept first and in order"
    );
    Ok(())
}

fn source_isolation(roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    let badge = random_badge(&engine, rng);
    let awarded: Vec<&Player> = roster.local.iter().filter(|_| rng.gen_bool(0.5)).collect();
    for player in &awarded {
        engine.toggle_award(&AllowAll, player, &badge)?;
    }

    let ledger = engine.ledger()?;
    if let Some(twin) = roster
        .feed
        .players()
        .iter()
        .find(|p| ledger.count(&engine.player_key(p), &badge) > 0)
    {
        bail!("feed player {} picked up {badge}", engine.player_key(twin));
    }

    let filters = LeaderboardFilters::default();
    let rows = engine.leaderboard(&roster.feed, &badge, &filters)?;
    ensure!(
        rows.len() == awarded.len().min(engine.config().leaderboard_size),
        "{} rows for {} awarded local players",
        rows.len(),
        awarded.len()
    );
    ensure!(
        rows.iter().all(|r| r.player.source == PlayerSource::Local),
        "feed player ranked without an award"
    );
    let projection = engine.summaries(&roster.feed)?;
    ensure!(
        projection.summaries.len() == awarded.len(),
        "{} summaries for {} awarded local players",
        projection.summaries.len(),
        awarded.len()
    );
    Ok(())
}

fn backfill_explicit(roster: &SyntheticRoster, rng: &mut ChaCha20Rng) -> Result<()> {
    let engine = engine_for(roster)?;
    let candidates: Vec<&Player> = roster.everyone().filter(|p| p.id.is_some()).collect();
    if candidates.is_empty() {
        return Ok(());
    }

    let mut raw = Map::new();
    for player in candidates.iter().filter(|_| rng.gen_bool(0.5)) {
        raw.insert(engine.player_key(player), json!({ "hustle": 1 }));
    }
    raw.insert("db_999999".to_string(), json!({ "captain": 1 }));
    let ledger: BadgeLedger = serde_json::from_value(Value::Object(raw))?;
    engine.storage().save_badges(&ledger)?;

    let writes = engine.storage().write_count();
    let projection = engine.summaries(&roster.feed)?;
    ensure!(
        engine.storage().write_count() == writes,
        "summaries wrote to storage"
    );
    ensure!(
        projection.backfill.iter().all(|need| need.key != "db_999999"),
        "unresolvable key scheduled for backfill"
    );
    ensure!(
        projection
            .summaries
            .iter()
            .any(|s| s.key == "db_999999" && s.player_info.name == "db_999999"),
        "unresolvable key did not fall back to its raw key"
    );

    let written = engine.backfill_snapshots(&roster.feed)?;
    ensure!(
        written == projection.backfill.len(),
        "backfilled {written} of {} pending snapshots",
        projection.backfill.len()
    );
    ensure!(
        engine.summaries(&roster.feed)?.backfill.is_empty(),
        "backfill left pending snapshots"
    );
    let writes = engine.storage().write_count();
    ensure!(engine.backfill_snapshots(&roster.feed)? == 0, "second backfill changed entries");
    ensure!(
        engine.storage().write_count() == writes,
        "no-op backfill wrote to storage"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn every_scenario_passes_on_a_fixed_seed() {
        for scenario in SCENARIOS {
            for size in [0, 1, 15] {
                let mut rng = ChaCha20Rng::seed_from_u64(1337);
                let roster = SyntheticRoster::generate(&mut rng, size);
                let outcome = (scenario.test_fn)(&roster, &mut rng);
                assert!(
                    outcome.is_ok(),
                    "{} failed with {size} players: {outcome:?}",
                    scenario.name
                );
            }
        }
    }

    #[test]
    fn scenarios_are_found_by_name() {
        assert!(get_scenario("smoke").is_some());
        assert!(get_scenario("missing").is_none());
        assert_eq!(list_scenarios().count(), all_scenario_names().len());
    }
}
