//! Static data bundled with the web build
use pitchrank_core::{BadgeCatalog, CatalogError, DataLoader, RankConfig};

/// Web-specific data loader reading the bundled static assets
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDataLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataLoader for WebDataLoader {
    type Error = WebDataError;

    fn load_catalog(&self) -> Result<BadgeCatalog, Self::Error> {
        let json = include_str!("../static/data/badges.json");
        Ok(BadgeCatalog::from_json(json)?)
    }

    fn load_config(&self) -> Result<RankConfig, Self::Error> {
        let json = include_str!("../static/data/config.json");
        Ok(RankConfig::from_json(json)?)
    }
}
