// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.carequeue/config.toml` and includes:
//! - `api`: where requests are sent and the API prefix stripped for routing
//! - `storage`: which key/value backend holds the offline queue
//! - `connectivity`: how reachability is probed
//! - `replay`: backoff between drain retries after a failed item
//! - `endpoints` / `excluded_paths`: the routes that may be deferred

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use cq_core::registry::{default_endpoints, DEFAULT_API_PREFIX, DEFAULT_EXCLUDED_PATHS};
use cq_core::{Endpoint, EndpointRegistry};

use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".carequeue";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_DIR_NAME: &str = "queue";
const QUEUE_DB_NAME: &str = "queue.db";

/// Project configuration stored in `.carequeue/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Infrastructure paths that are never queued (prefix match by segment).
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    /// Resource routes. Empty means the built-in hospital registry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,
}

/// API server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Origin that relative request URLs are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API base prefix stripped before route matching.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Timeout for requests that do not carry their own (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

/// Key/value backend for the offline queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
    Memory,
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Optional path (relative to the project root or absolute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Connectivity probe settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectivityConfig {
    /// Path probed on the API origin (any HTTP response counts as online).
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

/// Drain retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayConfig {
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
}

fn default_excluded_paths() -> Vec<String> {
    DEFAULT_EXCLUDED_PATHS.iter().map(|p| p.to_string()).collect()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_probe_path() -> String {
    "/health".to_string()
}

fn default_probe_interval_ms() -> u64 {
    5_000
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

fn default_initial_retry_delay_ms() -> u64 {
    1_000
}

fn default_max_retry_delay_ms() -> u64 {
    60_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            excluded_paths: default_excluded_paths(),
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            connectivity: ConnectivityConfig::default(),
            replay: ReplayConfig::default(),
            endpoints: Vec::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            prefix: default_prefix(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            probe_path: default_probe_path(),
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
        }
    }
}

impl ApiConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

impl ConnectivityConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Config {
    /// Creates a config pointing at the given API origin.
    pub fn new(base_url: &str, backend: StorageBackend) -> Result<Self> {
        let config = Config {
            api: ApiConfig {
                base_url: base_url.to_string(),
                ..ApiConfig::default()
            },
            storage: StorageConfig {
                backend,
                path: None,
            },
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        base_url(&self.api.base_url)?;
        if self.connectivity.probe_interval_ms == 0 {
            return Err(Error::Config(
                "connectivity.probe_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.replay.initial_retry_delay_ms > self.replay.max_retry_delay_ms {
            return Err(Error::Config(
                "replay.initial_retry_delay_ms cannot exceed replay.max_retry_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads configuration from the given `.carequeue/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.carequeue/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Builds the endpoint registry from the configured routes.
    pub fn registry(&self) -> Result<EndpointRegistry> {
        let endpoints = if self.endpoints.is_empty() {
            default_endpoints()
        } else {
            self.endpoints.clone()
        };
        Ok(EndpointRegistry::new(
            &self.api.prefix,
            &endpoints,
            &self.excluded_paths,
        )?)
    }

    /// Absolute URL probed for connectivity.
    pub fn probe_url(&self) -> Result<Url> {
        join_url(&base_url(&self.api.base_url)?, &self.connectivity.probe_path)
    }
}

/// Parses an API origin as a directory URL, so joined paths land under it.
pub fn base_url(base: &str) -> Result<Url> {
    let invalid = |reason: &str| Error::Config(format!("invalid api.base_url '{base}': {reason}"));
    let mut url = Url::parse(base.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("must start with http:// or https://"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolves `path` under `base` with exactly one slash between them.
pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| Error::Config(format!("invalid url path '{path}': {e}")))
}

/// Find the .carequeue directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the queue storage path from config.
///
/// File stores use a directory, SQLite stores a database file.
pub fn get_storage_path(work_dir: &Path, config: &Config) -> PathBuf {
    let default_name = match config.storage.backend {
        StorageBackend::Sqlite => QUEUE_DB_NAME,
        StorageBackend::File | StorageBackend::Memory => QUEUE_DIR_NAME,
    };
    match &config.storage.path {
        Some(path) => {
            let path = Path::new(path);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                // Relative to work_dir's parent (the project root)
                work_dir.parent().unwrap_or(work_dir).join(path)
            }
        }
        None => work_dir.join(default_name),
    }
}

/// Initialize a new .carequeue directory at the given path
pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;

    Ok(work_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
