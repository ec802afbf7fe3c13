//! Roster and leaderboard filters
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::player::{Gender, Player};

/// Literal used by the front end for "no constraint".
pub const ALL: &str = "ALL";

/// Equality constraint on a single player field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FacetFilter {
    #[default]
    All,
    Only(String),
}

impl FacetFilter {
    /// Parse a select-box value; `ALL` (any case) and blank mean no constraint.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn only(value: impl Into<String>) -> Self {
        Self::Only(value.into())
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl fmt::Display for FacetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FacetFilter {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for FacetFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FacetFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::All, Self::parse))
    }
}

/// Filters applied before ranking a badge leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardFilters {
    #[serde(default)]
    pub age_group: FacetFilter,
    #[serde(default)]
    pub league: FacetFilter,
    #[serde(default)]
    pub state: FacetFilter,
}

impl LeaderboardFilters {
    #[must_use]
    pub fn matches(&self, player: &Player) -> bool {
        self.age_group.matches(&player.age_group)
            && self.league.matches(&player.league)
            && self.state.matches(&player.state)
    }
}

/// Roster search: facet equality plus case-insensitive name/team substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFilter {
    #[serde(default)]
    pub age_group: FacetFilter,
    #[serde(default)]
    pub league: FacetFilter,
    #[serde(default)]
    pub state: FacetFilter,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: String,
}

impl PlayerFilter {
    #[must_use]
    pub fn matches(&self, player: &Player) -> bool {
        self.age_group.matches(&player.age_group)
            && self.league.matches(&player.league)
            && self.state.matches(&player.state)
            && self.gender.is_none_or(|g| player.gender == Some(g))
            && contains_ci(&player.name, &self.name)
            && contains_ci(&player.team_name, &self.team)
    }

    /// Players passing every predicate, in input order.
    #[must_use]
    pub fn apply<'a>(&self, players: &'a [Player]) -> Vec<&'a Player> {
        players.iter().filter(|p| self.matches(p)).collect()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, team: &str, age: &str, league: &str, state: &str) -> Player {
        Player {
            name: name.to_string(),
            team_name: team.to_string(),
            age_group: age.to_string(),
            league: league.to_string(),
            state: state.to_string(),
            gender: Some(Gender::Girls),
            ..Player::default()
        }
    }

    #[test]
    fn facet_parse_treats_all_and_blank_as_unconstrained() {
        assert_eq!(FacetFilter::parse("ALL"), FacetFilter::All);
        assert_eq!(FacetFilter::parse("all"), FacetFilter::All);
        assert_eq!(FacetFilter::parse(" "), FacetFilter::All);
        assert_eq!(FacetFilter::parse("G13"), FacetFilter::only("G13"));
    }

    #[test]
    fn facet_serializes_as_plain_string() {
        let filters: LeaderboardFilters =
            serde_json::from_str(r#"{"ageGroup":"G13","league":"ALL"}"#).unwrap();
        assert_eq!(filters.age_group, FacetFilter::only("G13"));
        assert_eq!(filters.league, FacetFilter::All);
        assert_eq!(filters.state, FacetFilter::All);
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"ageGroup":"G13","league":"ALL","state":"ALL"}"#);
    }

    #[test]
    fn leaderboard_filters_use_strict_equality() {
        let p = player("Lia", "Storm", "G13", "ECNL", "TX");
        let mut filters = LeaderboardFilters::default();
        assert!(filters.matches(&p));
        filters.age_group = FacetFilter::only("g13");
        assert!(!filters.matches(&p));
        filters.age_group = FacetFilter::only("G13");
        filters.state = FacetFilter::only("TX");
        assert!(filters.matches(&p));
        filters.league = FacetFilter::only("GA");
        assert!(!filters.matches(&p));
    }

    #[test]
    fn player_filter_combines_substrings_and_gender() {
        let roster = vec![
            player("Lia Moreno", "Austin Storm", "G13", "ECNL", "TX"),
            player("Maya Chen", "Dallas Fire", "G13", "ECNL", "TX"),
        ];
        let filter = PlayerFilter {
            name: "MOR".to_string(),
            ..PlayerFilter::default()
        };
        let hits = filter.apply(&roster);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Lia Moreno");

        let by_team = PlayerFilter {
            team: "fire".to_string(),
            gender: Some(Gender::Girls),
            ..PlayerFilter::default()
        };
        assert_eq!(by_team.apply(&roster)[0].name, "Maya Chen");

        let boys = PlayerFilter {
            gender: Some(Gender::Boys),
            ..PlayerFilter::default()
        };
        assert!(boys.apply(&roster).is_empty());
    }
}
