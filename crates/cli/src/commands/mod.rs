// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod check;
pub mod daemon;
pub mod init;
pub mod queue;
pub mod status;
pub mod submit;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{find_work_dir, Config};
use crate::error::{Error, Result};
use crate::storage::open_store;
use crate::sync::{ConnectivityProbe, HttpProbe, QueueStore};

/// Everything a command needs from the current project.
pub struct Context {
    pub work_dir: PathBuf,
    pub config: Config,
    pub store: Arc<QueueStore>,
}

/// Helper to open the queue from the current context.
pub fn open_context() -> Result<Context> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let storage = open_store(&work_dir, &config)?;
    Ok(Context {
        work_dir,
        config,
        store: Arc::new(QueueStore::new(storage)),
    })
}

/// Single-threaded runtime for one-shot commands.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Probes the configured health url once. Any failure reads as offline.
pub async fn probe_online(config: &Config) -> bool {
    let probe = config.probe_url().and_then(|url| {
        HttpProbe::new(url.as_str(), config.connectivity.probe_timeout())
            .map_err(|e| Error::Config(e.to_string()))
    });
    let probe = match probe {
        Ok(probe) => probe,
        Err(e) => {
            tracing::warn!(error = %e, "cannot build connectivity probe");
            return false;
        }
    };
    probe.probe().await.unwrap_or(false)
}
