//! Read-only external player feed
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::player::{Player, PlayerSource};

/// Distinct filter values present in a feed, sorted for select boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFacets {
    pub leagues: Vec<String>,
    pub states: Vec<String>,
    pub age_groups: Vec<String>,
}

/// Players supplied from outside this application. Never written back.
///
/// Every row is marked [`PlayerSource::Feed`] on the way in, whatever the
/// incoming data says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlayerFeed(Vec<Player>);

impl<'de> Deserialize<'de> for PlayerFeed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Player>::deserialize(deserializer).map(Self::from_players)
    }
}

impl PlayerFeed {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_players(mut players: Vec<Player>) -> Self {
        for player in &mut players {
            player.source = PlayerSource::Feed;
        }
        Self(players)
    }

    /// Load a feed from a JSON array of players.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into players.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.0
    }

    #[must_use]
    pub fn find_by_id(&self, id: u64) -> Option<&Player> {
        self.0.iter().find(|p| p.id == Some(id))
    }

    /// Distinct non-blank leagues, states and age groups.
    #[must_use]
    pub fn facets(&self) -> FeedFacets {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        FeedFacets {
            leagues: distinct(self.0.iter().map(|p| p.league.as_str())),
            states: distinct(self.0.iter().map(|p| p.state.as_str())),
            age_groups: distinct(self.0.iter().map(|p| p.age_group.as_str())),
        }
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
