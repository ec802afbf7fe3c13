//! Static badge catalog
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A badge a coach can award to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeType {
    pub id: String,
    pub name: String,
    pub emoji: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("badge catalog JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("badge catalog is empty")]
    Empty,
    #[error("duplicate badge id `{0}` in catalog")]
    Duplicate(String),
    #[error("badge id `{0}` is reserved")]
    Reserved(String),
}

/// Ordered, fixed set of badge types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeCatalog(Vec<BadgeType>);

const STANDARD: &[(&str, &str, &str, &str)] = &[
    ("mvp", "MVP", "🏆", "Most valuable player of the match"),
    ("hat_trick", "Hat Trick", "⚽", "Three goals in a single match"),
    ("playmaker", "Playmaker", "🎯", "Created chances all game long"),
    ("wall", "The Wall", "🧱", "Shut down every attack"),
    ("golden_glove", "Golden Glove", "🧤", "Keeper kept a clean sheet"),
    ("hustle", "Hustle", "⚡", "Never stopped running"),
    ("captain", "Captain", "©️", "Led the team on and off the field"),
    ("sportsmanship", "Sportsmanship", "🤝", "Fair play and respect for everyone"),
];

static STANDARD_CATALOG: Lazy<BadgeCatalog> = Lazy::new(|| {
    BadgeCatalog(
        STANDARD
            .iter()
            .map(|(id, name, emoji, description)| BadgeType {
                id: (*id).to_string(),
                name: (*name).to_string(),
                emoji: (*emoji).to_string(),
                description: (*description).to_string(),
            })
            .collect(),
    )
});

impl BadgeCatalog {
    /// Built-in catalog shipped with the platform.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_CATALOG
    }

    /// Build a catalog, rejecting empty sets, duplicates and ids that would
    /// clash with ledger metadata keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the set is empty or any id is duplicated or reserved.
    pub fn new(badges: Vec<BadgeType>) -> Result<Self, CatalogError> {
        if badges.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (idx, badge) in badges.iter().enumerate() {
            if badge.id.starts_with('_') {
                return Err(CatalogError::Reserved(badge.id.clone()));
            }
            if badges[..idx].iter().any(|b| b.id == badge.id) {
                return Err(CatalogError::Duplicate(badge.id.clone()));
            }
        }
        Ok(Self(badges))
    }

    /// Load a catalog from a JSON array of badge types.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let badges: Vec<BadgeType> = serde_json::from_str(json)?;
        Self::new(badges)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BadgeType> {
        self.0.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BadgeType> {
        self.0.iter()
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

impl Default for BadgeCatalog {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl<'a> IntoIterator for &'a BadgeCatalog {
    type Item = &'a BadgeType;
    type IntoIter = std::slice::Iter<'a, BadgeType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
