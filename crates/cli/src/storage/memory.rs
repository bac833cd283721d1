// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Mutex;

use super::{validate_key, KeyValueStore, StorageError, StorageResult, Update};

/// Process-local storage. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.items()?.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Update,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let mut items = self.items()?;
        match apply(items.get(key).map(String::as_str)) {
            Update::Keep => {}
            Update::Set(value) => {
                items.insert(key.to_string(), value);
            }
            Update::Remove => {
                items.remove(key);
            }
        }
        Ok(())
    }
}
