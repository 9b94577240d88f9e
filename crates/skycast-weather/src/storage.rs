//! Durable key-value slots for the search history and unit preference.
//!
//! Loading never fails: unreadable or corrupt data is logged and replaced by
//! an empty history / the default unit.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::history::SearchHistory;
use crate::types::{StorageError, TemperatureUnit};

pub const HISTORY_KEY: &str = "search_history";
pub const UNIT_KEY: &str = "temperature_unit";

/// String-keyed durable storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One file per key inside a directory.
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
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write to a sibling temp file then rename, so a crash never leaves a
        // half-written slot behind.
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and sessions that shouldn't touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

/// Restore the persisted history, or an empty one if it can't be read.
pub fn load_history(store: &dyn KeyValueStore) -> SearchHistory {
    let mut history = SearchHistory::new();

    let raw = match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return history,
        Err(e) => {
            tracing::warn!("Failed to read search history, starting empty: {}", e);
            return history;
        }
    };

    match SearchHistory::deserialize(&raw) {
        Ok(entries) => {
            tracing::debug!("Restored {} history entries", entries.len());
            history.load(entries);
        }
        Err(e) => {
            tracing::warn!("Failed to parse search history, starting empty: {}", e);
        }
    }

    history
}

pub fn save_history(
    store: &dyn KeyValueStore,
    history: &SearchHistory,
) -> Result<(), StorageError> {
    let raw = history.serialize()?;
    store.set(HISTORY_KEY, &raw)
}

/// Restore the unit preference, or the default if missing or unrecognized.
pub fn load_unit(store: &dyn KeyValueStore) -> TemperatureUnit {
    match store.get(UNIT_KEY) {
        Ok(Some(raw)) => TemperatureUnit::parse(&raw).unwrap_or_else(|| {
            tracing::warn!("Unrecognized temperature unit {:?}, using default", raw);
            TemperatureUnit::default()
        }),
        Ok(None) => TemperatureUnit::default(),
        Err(e) => {
            tracing::warn!("Failed to read temperature unit, using default: {}", e);
            TemperatureUnit::default()
        }
    }
}

pub fn save_unit(store: &dyn KeyValueStore, unit: TemperatureUnit) -> Result<(), StorageError> {
    store.set(UNIT_KEY, unit.as_str())
}
