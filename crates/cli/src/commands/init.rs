// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::{get_storage_path, init_work_dir, Config, StorageBackend};
use crate::error::Result;

pub fn run(base_url: Option<String>, backend: Option<StorageBackend>) -> Result<()> {
    let target_path = std::env::current_dir()?;
    let config = build_config(base_url.as_deref(), backend)?;
    let work_dir = init(&target_path, &config)?;

    println!("Initialized offline queue at {}", work_dir.display());
    println!("API: {}", config.api.base_url);
    println!(
        "Storage: {:?} ({})",
        config.storage.backend,
        get_storage_path(&work_dir, &config).display()
    );
    Ok(())
}

pub(crate) fn build_config(
    base_url: Option<&str>,
    backend: Option<StorageBackend>,
) -> Result<Config> {
    let defaults = Config::default();
    Config::new(
        base_url.unwrap_or(defaults.api.base_url.as_str()),
        backend.unwrap_or_default(),
    )
}

pub(crate) fn init(target_path: &Path, config: &Config) -> Result<std::path::PathBuf> {
    let work_dir = init_work_dir(target_path, config)?;
    // Fail here on an unusable storage path.
    crate::storage::open_store(&work_dir, config)?;
    Ok(work_dir)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
