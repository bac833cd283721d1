// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed key/value storage.
//!
//! Each key is a `<key>.json` file inside the store directory. Writes go
//! to a temp file that is fsynced and renamed over the target, so a crash
//! leaves either the old or the new value. An flock on `.lock` serialises
//! writers across processes (the CLI and the daemon share one store), and
//! is held from read to rename in [`KeyValueStore::update`].

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{validate_key, KeyValueStore, StorageResult, Update};

const LOCK_NAME: &str = ".lock";

/// Directory of one file per key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens or creates a store in the given directory.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn lock(&self, exclusive: bool) -> StorageResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_NAME))?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    fn read_locked(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_locked(&self, key: &str, value: &str) -> StorageResult<()> {
        let target = self.item_path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &target)?;

        // Persist the rename itself
        if let Ok(dir) = File::open(&self.dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    fn remove_locked(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let _lock = self.lock(false)?;
        self.read_locked(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let _lock = self.lock(true)?;
        self.write_locked(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let _lock = self.lock(true)?;
        self.remove_locked(key)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Update,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let _lock = self.lock(true)?;
        let current = self.read_locked(key)?;
        match apply(current.as_deref()) {
            Update::Keep => Ok(()),
            Update::Set(value) => self.write_locked(key, &value),
            Update::Remove => self.remove_locked(key),
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
