//! Engine error type
use thiserror::Error;

use crate::player::PlayerValidationError;

/// Failures surfaced by [`crate::RankEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("storage error: {0}")]
    Storage(#[source] E),
    #[error("capability `{0}` is required")]
    Forbidden(&'static str),
    #[error("unknown badge type `{0}`")]
    UnknownBadge(String),
    #[error("no local player with id {0}")]
    UnknownPlayer(u64),
    #[error("profile {player_id} is already claimed")]
    AlreadyClaimed { player_id: u64 },
    #[error(transparent)]
    Invalid(#[from] PlayerValidationError),
}

impl<E> EngineError<E>
where
    E: std::error::Error + 'static,
{
    /// Wrap a storage failure.
    pub fn storage(err: E) -> Self {
        Self::Storage(err)
    }
}
