//! Player records and identity keys
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Default prefix applied to durable ids when deriving ledger keys.
pub const EXTERNAL_KEY_PREFIX: &str = "db_";

/// Competition gender of a player's age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Boys,
    Girls,
}

impl Gender {
    /// Lenient parse used for feed data and CLI input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "b" | "boy" | "boys" | "m" | "male" => Some(Self::Boys),
            "g" | "girl" | "girls" | "f" | "female" => Some(Self::Girls),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Boys => write!(f, "Boys"),
            Gender::Girls => write!(f, "Girls"),
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown gender `{raw}`")))
    }
}

fn lenient_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Gender::parse))
}

/// Where a player record came from. Decides its ledger key namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSource {
    #[default]
    Local,
    Feed,
}

impl PlayerSource {
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

/// A player on the platform, either entered locally or supplied by the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Durable identity; absent for feed rows without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub position: String,
    /// Age group code such as `G13` or `B11`
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub club: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad_year: Option<u16>,
    #[serde(
        default,
        deserialize_with = "lenient_gender",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Gender>,
    /// Owner id of the account that claimed this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Set to [`PlayerSource::Feed`] by [`crate::PlayerFeed`]; omitted for local rows
    #[serde(default, skip_serializing_if = "PlayerSource::is_local")]
    pub source: PlayerSource,
}

impl Player {
    /// Ledger key using the default external prefix.
    #[must_use]
    pub fn key(&self) -> String {
        self.key_with_prefix(EXTERNAL_KEY_PREFIX)
    }

    /// Ledger key for this player.
    ///
    /// Local players with a durable id are keyed by the bare id and feed
    /// players by `<prefix><id>`, so equal ids from the two sources never
    /// share an entry. Everyone else falls back to a normalized `name_team`
    /// composite, which collides for players sharing a name and team and
    /// changes when either is edited.
    #[must_use]
    pub fn key_with_prefix(&self, prefix: &str) -> String {
        match (self.id, self.source) {
            (Some(id), PlayerSource::Local) => id.to_string(),
            (Some(id), PlayerSource::Feed) => format!("{prefix}{id}"),
            (None, _) => format!(
                "{}_{}",
                normalize_key_part(&self.name),
                normalize_key_part(&self.team_name)
            ),
        }
    }

    /// Identity used when merging local and feed rosters.
    #[must_use]
    pub fn merge_key(&self) -> String {
        format!("{}-{}", self.name, self.team_name).to_lowercase()
    }

    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }
}

fn normalize_key_part(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Reasons a manual player entry is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerValidationError {
    #[error("player name is required")]
    MissingName,
    #[error("team name is required")]
    MissingTeam,
}

/// Manual entry form for a local player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub state: String,
    pub team_name: String,
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub jersey_number: Option<String>,
    #[serde(default)]
    pub grad_year: Option<u16>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
}

impl NewPlayer {
    /// Check required fields and build the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or team name is blank.
    pub fn into_player(self, id: u64) -> Result<Player, PlayerValidationError> {
        let name = self.name.trim().to_string();
        let team_name = self.team_name.trim().to_string();
        if name.is_empty() {
            return Err(PlayerValidationError::MissingName);
        }
        if team_name.is_empty() {
            return Err(PlayerValidationError::MissingTeam);
        }
        Ok(Player {
            id: Some(id),
            name,
            position: self.position.trim().to_string(),
            age_group: self.age_group.trim().to_uppercase(),
            league: self.league.trim().to_string(),
            state: self.state.trim().to_string(),
            team_name,
            club: self.club.trim().to_string(),
            jersey_number: self
                .jersey_number
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            grad_year: self.grad_year,
            gender: self.gender,
            claimed_by: None,
            photo_url: None,
            source: PlayerSource::Local,
        })
    }
}

/// Next durable id for a local roster.
#[must_use]
pub fn next_player_id(players: &[Player]) -> u64 {
    players
        .iter()
        .filter_map(|p| p.id)
        .max()
        .map_or(1, |id| id.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: Option<u64>, name: &str, team: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            team_name: team.to_string(),
            ..Player::default()
        }
    }

    fn feed_player(id: Option<u64>, name: &str, team: &str) -> Player {
        Player {
            source: PlayerSource::Feed,
            ..player(id, name, team)
        }
    }

    #[test]
    fn local_id_is_the_bare_key() {
        assert_eq!(player(Some(7), "Ana", "Fire").key(), "7");
        assert_eq!(player(Some(7), "Ana", "Fire").key_with_prefix("x-"), "7");
    }

    #[test]
    fn feed_id_gets_prefixed_key() {
        assert_eq!(feed_player(Some(7), "Ana", "Fire").key(), "db_7");
        assert_eq!(
            feed_player(Some(7), "Ana", "Fire").key_with_prefix("x-"),
            "x-7"
        );
    }

    #[test]
    fn equal_ids_from_each_source_get_distinct_keys() {
        let local = player(Some(1), "Ana", "Storm");
        let feed = feed_player(Some(1), "Bea", "Fire");
        assert_ne!(local.key(), feed.key());
        assert_eq!(
            feed_player(None, "Ana", "Storm").key(),
            player(None, "Ana", "Storm").key()
        );
    }

    #[test]
    fn source_survives_json_and_defaults_to_local() {
        let feed = feed_player(Some(3), "Bea", "Fire");
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["source"], "feed");
        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back.key(), "db_3");

        let local = player(Some(3), "Ana", "Storm");
        let json = serde_json::to_value(&local).unwrap();
        assert!(json.get("source").is_none());
        let stored: Player = serde_json::from_str(r#"{"id":3,"name":"Ana"}"#).unwrap();
        assert_eq!(stored.source, PlayerSource::Local);
    }

    #[test]
    fn fallback_key_normalizes_whitespace_and_case() {
        let p = player(None, "  Ana   Maria ", "FC  Fire\tU13");
        assert_eq!(p.key(), "ana_maria_fc_fire_u13");
        let same = player(None, "ana maria", "fc fire u13");
        assert_eq!(p.key(), same.key());
    }

    #[test]
    fn merge_key_lowercases_without_collapsing() {
        assert_eq!(player(None, "Ana", "FC Fire").merge_key(), "ana-fc fire");
    }

    #[test]
    fn gender_parse_is_lenient() {
        assert_eq!(Gender::parse("G"), Some(Gender::Girls));
        assert_eq!(Gender::parse(" boys "), Some(Gender::Boys));
        assert_eq!(Gender::parse("Female"), Some(Gender::Girls));
        assert_eq!(Gender::parse("coed"), None);
    }

    #[test]
    fn feed_json_with_unknown_gender_still_loads() {
        let json = r#"{"name":"Lia","teamName":"Storm","ageGroup":"G13","gender":"mixed"}"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.gender, None);
        assert_eq!(p.age_group, "G13");
        assert!(p.id.is_none());
    }

    #[test]
    fn new_player_requires_name_and_team() {
        let blank_name = NewPlayer {
            name: "   ".to_string(),
            team_name: "Storm".to_string(),
            ..NewPlayer::default()
        };
        assert_eq!(
            blank_name.into_player(1),
            Err(PlayerValidationError::MissingName)
        );

        let blank_team = NewPlayer {
            name: "Lia".to_string(),
            ..NewPlayer::default()
        };
        assert_eq!(
            blank_team.into_player(1),
            Err(PlayerValidationError::MissingTeam)
        );
    }

    #[test]
    fn new_player_trims_and_assigns_id() {
        let entry = NewPlayer {
            name: " Lia ".to_string(),
            team_name: "Storm ".to_string(),
            age_group: "g13".to_string(),
            jersey_number: Some("  ".to_string()),
            ..NewPlayer::default()
        };
        let p = entry.into_player(4).unwrap();
        assert_eq!(p.id, Some(4));
        assert_eq!(p.name, "Lia");
        assert_eq!(p.team_name, "Storm");
        assert_eq!(p.age_group, "G13");
        assert_eq!(p.jersey_number, None);
    }

    #[test]
    fn next_id_follows_highest_existing() {
        assert_eq!(next_player_id(&[]), 1);
        let roster = vec![player(Some(3), "a", "x"), player(None, "b", "y")];
        assert_eq!(next_player_id(&roster), 4);
    }
}
