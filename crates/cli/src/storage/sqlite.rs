// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed key/value storage.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{validate_key, KeyValueStore, StorageError, StorageResult, Update};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";

const SELECT_VALUE: &str = "SELECT value FROM kv WHERE key = ?1";

const UPSERT_VALUE: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const DELETE_VALUE: &str = "DELETE FROM kv WHERE key = ?1";

/// Key/value table in a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database file at `path`.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA journal_mode = WAL;",
        )?;
        Self::with_connection(conn)
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("sqlite connection lock poisoned".to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let value = self
            .conn()?
            .query_row(SELECT_VALUE, params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.conn()?.execute(UPSERT_VALUE, params![key, value])?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.conn()?.execute(DELETE_VALUE, params![key])?;
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Update,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock before the read
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
            .query_row(SELECT_VALUE, params![key], |row| row.get(0))
            .optional()?;
        match apply(current.as_deref()) {
            Update::Keep => {}
            Update::Set(value) => {
                tx.execute(UPSERT_VALUE, params![key, value])?;
            }
            Update::Remove => {
                tx.execute(DELETE_VALUE, params![key])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
