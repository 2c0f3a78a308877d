//! Key-value persistence for the task list and streak.
//!
//! Two keys are used: [`TASKS_KEY`] holds the serialized task sequence and
//! [`STREAK_KEY`] the serialized streak. An absent key means "use the default".

pub mod file;
pub mod memory;
pub mod sqlite;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key for the serialized task sequence.
pub const TASKS_KEY: &str = "tasks";

/// Key for the serialized streak state.
pub const STREAK_KEY: &str = "streak";

/// Synchronous string key-value store.
pub trait KvStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Open the backend selected by configuration.
pub fn open(config: &StorageConfig) -> Result<Arc<dyn KvStore>> {
    debug!(backend = ?config.backend, dir = %config.dir.display(), "Opening storage");
    let store: Arc<dyn KvStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Json => Arc::new(JsonFileStore::open(&config.dir)?),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(config.sqlite_path())?),
    };
    Ok(store)
}

/// Keys are used as file names by the JSON backend, so keep them plain.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
