//! Persisted preferences behind a small key-value port.
//!
//! Stores hold JSON values by key. Reads that find nothing usable fall back
//! to a default and writes that fail are logged and dropped, so a broken
//! settings file never stops the reader.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::Result;

/// Key under which the reading rate is saved.
pub const WPM_KEY: &str = "rsvp-wpm";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// All keys in one pretty-printed JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        match self.read_all() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "settings not loaded");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        // an unreadable file is replaced rather than blocking the write
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Process-local store, used when no settings file is wanted and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// A value mirrored to a store under a fixed key.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    key: String,
    value: T,
}

impl<T> Stored<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Read `key`, using `fallback` when it is missing or does not decode
    /// as `T`.
    pub fn load(store: &dyn KeyValueStore, key: impl Into<String>, fallback: T) -> Self {
        let key = key.into();
        let value = store
            .get(&key)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(fallback);
        Self { key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Update the value. The in-memory copy always changes; a failed write
    /// is only logged.
    pub fn set(&mut self, store: &dyn KeyValueStore, value: T) {
        let written = serde_json::to_value(&value)
            .map_err(Into::into)
            .and_then(|v| store.set(&self.key, v));
        if let Err(e) = written {
            warn!(key = %self.key, error = %e, "could not persist setting");
        }
        self.value = value;
    }
}
