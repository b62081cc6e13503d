//! Filesystem-backed key/value store for cached payloads

use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;

/// Persistent mapping from string keys to JSON values
///
/// Each key is stored as `<key>.json` in an XDG-compliant cache directory
/// (`~/.cache/porthole/` on Linux). Values are raw JSON payloads with no
/// metadata wrapper; the key names form the crate's stable external schema
/// and must not change between releases.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a new CacheStore using the XDG-compliant cache directory.
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "porthole")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheStore rooted at a custom directory.
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the file backing the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir).await
    }

    /// Writes `value` under `key`, overwriting any prior entry.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> io::Result<()> {
        self.ensure_dir().await?;

        let json = serde_json::to_string(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.entry_path(key), json).await
    }

    /// Reads the entry stored under `key`.
    ///
    /// Returns `None` if the entry does not exist or cannot be parsed into
    /// `T`; a corrupted entry is indistinguishable from an absent one.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = fs::read_to_string(self.entry_path(key)).await.ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Removes the entry stored under `key`.
    ///
    /// Removing an absent entry is not an error, which keeps invalidation
    /// idempotent for callers that cannot know whether an entry exists.
    pub async fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.entry_path(key)).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
