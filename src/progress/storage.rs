//! Durable key-value substrate and progress persistence.
//!
//! The whole [`ProgressStore`] is serialized to one JSON value under one
//! fixed key and written in a single `set`, never incrementally.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::progress::store::ProgressStore;

/// Default key the progress map is stored under
pub const DEFAULT_STORAGE_KEY: &str = "coursetrack.progress";

/// Error type for the durable substrate
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Minimal durable key-value substrate
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile substrate for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a reader sees either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }
}

/// Loads and saves the progress map through a [`KeyValueStore`]
#[derive(Debug)]
pub struct ProgressStorage<S> {
    substrate: S,
    key: String,
}

impl<S: KeyValueStore> ProgressStorage<S> {
    pub fn new(substrate: S) -> Self {
        Self::with_key(substrate, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(substrate: S, key: impl Into<String>) -> Self {
        Self {
            substrate,
            key: key.into(),
        }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Read the stored map. Absent, unreadable or malformed values all load
    /// as an empty store; the next save overwrites them.
    pub fn load(&self) -> ProgressStore {
        let raw = match self.substrate.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("No stored progress under {:?}", self.key);
                return ProgressStore::new();
            }
            Err(e) => {
                log::warn!("Failed to read stored progress, starting empty: {}", e);
                return ProgressStore::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Stored progress is malformed, starting empty: {}", e);
                ProgressStore::new()
            }
        }
    }

    /// Write the complete map in one operation
    pub fn save(&mut self, store: &ProgressStore) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(store)?;
        self.substrate.set(&self.key, &serialized)?;
        log::debug!("Saved progress for {} video(s)", store.len());
        Ok(())
    }
}
