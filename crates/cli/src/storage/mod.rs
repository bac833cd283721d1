// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Key/value storage backends for the offline queue.
//!
//! The queue store persists its whole list under a single key, so any
//! backend that can durably get/set/remove a string value will do:
//!
//! - [`FileStore`]: one file per key, atomic replace, cross-process lock
//!   held across [`KeyValueStore::update`]
//! - [`SqliteStore`]: a `kv` table in a SQLite database
//! - [`MemoryStore`]: process-local, for tests and ephemeral sessions

mod file;
mod memory;
mod sqlite;

use std::path::Path;
use std::sync::Arc;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::{get_storage_path, Config, StorageBackend};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Backend cannot be used right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if it was never set.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Durably stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Reads `key`, hands the value to `apply` and stores what it returns,
    /// all under one write lock. No other writer, in this process or
    /// another, can interleave between the read and the write.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Update,
    ) -> StorageResult<()>;
}

/// What an [`KeyValueStore::update`] callback wants done with the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Leave the stored value as it is.
    Keep,
    /// Replace the value.
    Set(String),
    /// Remove the key.
    Remove,
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Update,
    ) -> StorageResult<()> {
        (**self).update(key, apply)
    }
}

/// Opens the backend selected in the config.
pub fn open_store(work_dir: &Path, config: &Config) -> StorageResult<Box<dyn KeyValueStore>> {
    let path = get_storage_path(work_dir, config);
    let store: Box<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => Box::new(FileStore::open(&path)?),
        StorageBackend::Sqlite => Box::new(SqliteStore::open(&path)?),
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    };
    tracing::debug!(
        backend = ?config.storage.backend,
        path = %path.display(),
        "opened queue storage"
    );
    Ok(store)
}

/// Keys are used as file names, so keep them to a safe alphabet.
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
