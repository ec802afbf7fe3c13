//! Seeded synthetic rosters for property checks
use pitchrank_core::{Gender, Player, PlayerFeed};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

const FIRST_NAMES: &[&str] = &[
    "Ava", "Mia", "Noah", "Liam", "Emma", "Leo", "Zoe", "Kai", "Ivy", "Eli", "Maya", "Owen",
];
const LAST_NAMES: &[&str] = &[
    "Garcia", "Smith", "Nguyen", "Okafor", "Rossi", "Kim", "Silva", "Brown",
];
const TEAMS: &[&str] = &["Storm FC", "Rapids", "United 2012", "Blue Wave", "Strikers"];
const POSITIONS: &[&str] = &["GK", "DEF", "MID", "FWD"];
const LEAGUES: &[&str] = &["ECNL", "NPL", "MLS NEXT"];
const STATES: &[&str] = &["CA", "TX", "WA", "FL"];
const AGE_GROUPS: &[&str] = &["B12", "G12", "B14", "G14"];

/// A local roster plus an external feed that overlaps it by name and team.
#[derive(Debug, Clone)]
pub struct SyntheticRoster {
    pub local: Vec<Player>,
    pub feed: PlayerFeed,
}

fn pick<'a>(rng: &mut ChaCha20Rng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn random_player(rng: &mut ChaCha20Rng, id: Option<u64>) -> Player {
    let age_group = pick(rng, AGE_GROUPS);
    Player {
        id,
        name: format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
        position: pick(rng, POSITIONS).to_string(),
        age_group: age_group.to_string(),
        league: pick(rng, LEAGUES).to_string(),
        state: pick(rng, STATES).to_string(),
        team_name: pick(rng, TEAMS).to_string(),
        jersey_number: rng
            .gen_bool(0.7)
            .then(|| rng.gen_range(1..=99).to_string()),
        gender: Gender::parse(&age_group[..1]),
        ..Player::default()
    }
}

impl SyntheticRoster {
    /// Build a roster of up to `size` local players and a feed of similar size.
    /// Feed ids reuse the local id range. Some feed players duplicate local
    /// ones with different casing, and some carry no id at all.
    pub fn generate(rng: &mut ChaCha20Rng, size: usize) -> Self {
        let local: Vec<Player> = (1..=size as u64)
            .map(|id| random_player(rng, Some(id)))
            .collect();

        let mut feed = Vec::with_capacity(size);
        for offset in 0..size as u64 {
            let roll: f64 = rng.r#gen();
            let player = if roll < 0.25 && !local.is_empty() {
                let source = &local[rng.gen_range(0..local.len())];
                Player {
                    id: Some(offset + 1),
                    name: source.name.to_uppercase(),
                    team_name: source.team_name.to_lowercase(),
                    ..random_player(rng, None)
                }
            } else if roll < 0.4 {
                random_player(rng, None)
            } else {
                random_player(rng, Some(offset + 1))
            };
            feed.push(player);
        }

        Self {
            local,
            feed: PlayerFeed::from_players(feed),
        }
    }

    /// Local players followed by feed players, duplicates included.
    pub fn everyone(&self) -> impl Iterator<Item = &Player> {
        self.local.iter().chain(self.feed.players())
    }
}
