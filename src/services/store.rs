//! Persistent key-value store
//!
//! String keys to string values, with typed JSON helpers on top. One store
//! is shared process-wide and handed to each service as a
//! [`StoreHandle`]. Every `set` is a single atomic write, so readers never
//! observe a partial value.

use serde::{de::DeserializeOwned, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store lock poisoned")]
    Poisoned,
    #[error("Invalid value: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic string-keyed persisted storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Shared store handle
pub type StoreHandle = Arc<dyn KeyValueStore>;

/// Get a key and deserialize
///
/// An unreadable value is treated as missing and logged; stored data written
/// by an older build should not take a screen down.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                tracing::warn!("Discarding unreadable value for {}: {}", key, e);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

/// Serialize and set a key
pub fn set_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> StoreResult<()> {
    let serialized = serde_json::to_string(value)?;
    store.set(key, &serialized)
}

// ============================================================================
// File store
// ============================================================================

/// One file per key under a data directory
///
/// File names are the SHA-1 of the key, so arbitrary keys are safe on any
/// filesystem. Writes go to a temp file and are renamed into place.
///
/// All I/O is blocking `std::fs`; async callers on a hot path should wrap
/// calls in `tokio::task::spawn_blocking`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::debug!("File store opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn hash_key(key: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(key.as_bytes());
        let result = hasher.finalize();
        format!("{:x}", result)
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::hash_key(key)))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", Self::hash_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.value_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.value_path(key);
        let tmp_path = self.tmp_path(key);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        // Atomic replace to avoid readers seeing partial writes
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// In-process store, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle() -> StoreHandle {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}
