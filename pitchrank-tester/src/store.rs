//! Data-directory backed storage, static data and image hosting
use pitchrank_core::{
    BadgeCatalog, BadgeLedger, CatalogError, DataLoader, ImageBlob, ImageStore, Player,
    PlayerFeed, RankConfig, RankStorage,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog error in {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

fn read_optional(path: &Path) -> Result<Option<String>, FileStorageError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FileStorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, FileStorageError> {
    match read_optional(path)? {
        Some(text) => serde_json::from_str(&text).map_err(|source| FileStorageError::Json {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(T::default()),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FileStorageError> {
    let io_err = |source| FileStorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let payload = serde_json::to_vec_pretty(value).map_err(|source| FileStorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    // Write-then-rename so a crash never leaves a half-written document.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

/// `players.json` and `badges.json` inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn players_path(&self) -> PathBuf {
        self.root.join("players.json")
    }

    fn badges_path(&self) -> PathBuf {
        self.root.join("badges.json")
    }

    /// External feed from `feed.json`, empty when absent.
    pub fn load_feed(&self) -> Result<PlayerFeed, FileStorageError> {
        read_json(&self.root.join("feed.json"))
    }
}

impl RankStorage for FileStorage {
    type Error = FileStorageError;

    fn load_players(&self) -> Result<Vec<Player>, Self::Error> {
        read_json(&self.players_path())
    }

    fn save_players(&self, players: &[Player]) -> Result<(), Self::Error> {
        write_json(&self.players_path(), players)
    }

    fn load_badges(&self) -> Result<BadgeLedger, Self::Error> {
        read_json(&self.badges_path())
    }

    fn save_badges(&self, ledger: &BadgeLedger) -> Result<(), Self::Error> {
        write_json(&self.badges_path(), ledger)
    }
}

/// Reads `catalog.json` / `config.json` overrides, falling back to built-ins.
#[derive(Debug, Clone)]
pub struct FileDataLoader {
    root: PathBuf,
}

impl FileDataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataLoader for FileDataLoader {
    type Error = FileStorageError;

    fn load_catalog(&self) -> Result<BadgeCatalog, Self::Error> {
        let path = self.root.join("catalog.json");
        match read_optional(&path)? {
            Some(text) => BadgeCatalog::from_json(&text)
                .map_err(|source| FileStorageError::Catalog { path, source }),
            None => Ok(BadgeCatalog::standard().clone()),
        }
    }

    fn load_config(&self) -> Result<RankConfig, Self::Error> {
        read_json(&self.root.join("config.json"))
    }
}

/// Image "hosting" in a local directory, returning `file://` URLs.
#[derive(Debug, Clone)]
pub struct DirImageStore {
    root: Option<PathBuf>,
}

impl DirImageStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn path_for(root: &Path, owner_id: &str, target_id: &str) -> PathBuf {
        root.join(owner_id).join(target_id)
    }
}

impl ImageStore for DirImageStore {
    type Error = FileStorageError;

    fn is_configured(&self) -> bool {
        self.root.is_some()
    }

    async fn upload_image(
        &self,
        owner_id: &str,
        target_id: &str,
        blob: &ImageBlob,
    ) -> Result<String, Self::Error> {
        let Some(root) = &self.root else {
            return Err(FileStorageError::Io {
                path: PathBuf::new(),
                source: io::Error::new(io::ErrorKind::NotFound, "no photo directory"),
            });
        };
        let path = Self::path_for(root, owner_id, target_id);
        let io_err = |source| FileStorageError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&path, &blob.bytes).await.map_err(io_err)?;
        let absolute = tokio::fs::canonicalize(&path).await.map_err(io_err)?;
        Ok(format!("file://{}", absolute.display()))
    }

    async fn delete_image(&self, owner_id: &str, target_id: &str) -> Result<(), Self::Error> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let path = Self::path_for(root, owner_id, target_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FileStorageError::Io { path, source }),
        }
    }
}
