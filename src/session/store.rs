//! Token Persistence
//!
//! Key-value storage for the session token. The file-backed store keeps a
//! small JSON object on disk so other keys written alongside the token
//! survive token updates.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Well-known key the session token is stored under
pub const TOKEN_STORAGE_KEY: &str = "hubspotToken";

/// Persistent token storage
///
/// An empty stored value is reported as absent.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StoreError>;

    fn save(&self, token: &str) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    fn has_token(&self) -> Result<bool, StoreError> {
        Ok(self.load()?.is_some())
    }
}

/// Token store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access token store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt token store {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Token store lock poisoned")]
    Poisoned,
}

/// Token store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Like `read_map`, but a corrupt document starts over as an empty map
    fn read_map_for_write(&self) -> Result<Map<String, Value>, StoreError> {
        match self.read_map() {
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "Discarding corrupt token store");
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(map).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        std::fs::write(&self.path, content).map_err(io_err)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        let mut map = self.read_map_for_write()?;
        map.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.read_map() {
            Ok(mut map) => {
                if map.remove(TOKEN_STORAGE_KEY).is_some() {
                    self.write_map(&map)?;
                }
                Ok(())
            }
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "Resetting corrupt token store");
                self.write_map(&Map::new())
            }
            Err(e) => Err(e),
        }
    }
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let guard = self.token.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone().filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        let mut guard = self.token.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.token.write().map_err(|_| StoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("storage.json"));
        assert!(store.load().unwrap().is_none());
        assert!(!store.has_token().unwrap());
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let store = FileTokenStore::new(&path);

        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));

        // A second handle on the same file sees the token
        let other = FileTokenStore::new(&path);
        assert_eq!(other.load().unwrap().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert!(other.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_preserves_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.save("abc").unwrap();
        store.clear().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let map: Map<String, Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(map.get("theme").and_then(Value::as_str), Some("dark"));
        assert!(!map.contains_key(TOKEN_STORAGE_KEY));
    }

    #[test]
    fn test_file_store_empty_token_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"hubspotToken": ""}"#).unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_file_store_save_over_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[]").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));

        store.save("fresh").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_file_store_clear_over_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"hubspotToken": "tru"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save("xyz").unwrap();
        assert!(store.has_token().unwrap());

        store.save("").unwrap();
        assert!(!store.has_token().unwrap());
    }
}
