//! Ranking configuration
use serde::{Deserialize, Serialize};

use crate::leaderboard::LEADERBOARD_SIZE;
use crate::player::EXTERNAL_KEY_PREFIX;

/// Tunables loaded alongside the badge catalog.
/// All fields default when missing from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankConfig {
    /// Rows shown on a badge leaderboard
    pub leaderboard_size: usize,
    /// Prefix for ledger keys derived from durable ids
    pub external_key_prefix: String,
    /// Namespace for persisted keys (`<namespace>.players`, `<namespace>.badges`)
    pub storage_namespace: String,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            leaderboard_size: LEADERBOARD_SIZE,
            external_key_prefix: EXTERNAL_KEY_PREFIX.to_string(),
            storage_namespace: "pitchrank".to_string(),
        }
    }
}

impl RankConfig {
    /// Load configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn players_key(&self) -> String {
        format!("{}.players", self.storage_namespace)
    }

    #[must_use]
    pub fn badges_key(&self) -> String {
        format!("{}.badges", self.storage_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = RankConfig::from_json(r#"{"leaderboardSize": 5}"#).unwrap();
        assert_eq!(cfg.leaderboard_size, 5);
        assert_eq!(cfg.external_key_prefix, "db_");
        assert_eq!(cfg.players_key(), "pitchrank.players");
        assert_eq!(cfg.badges_key(), "pitchrank.badges");
    }
}
