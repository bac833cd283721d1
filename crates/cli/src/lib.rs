// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cqrs - Offline mutation queue for the ward API.
//!
//! This crate provides the functionality behind the `cq` CLI tool: mutations
//! made while the API is unreachable are stored durably and replayed in
//! order once connectivity returns.
//!
//! # Main Components
//!
//! - [`Config`] - Project configuration (`.carequeue/config.toml`)
//! - [`storage`] - Key/value backends holding the persisted queue
//! - [`sync`] - Queue store, connectivity monitor, interceptor and replay engine
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use cqrs::sync::{hydrate, ConnectivityState, OfflineInterceptor, QueueStore, TracingReporter};
//! use cqrs::storage::open_store;
//!
//! let work_dir = cqrs::find_work_dir()?;
//! let config = cqrs::Config::load(&work_dir)?;
//! let store = Arc::new(QueueStore::new(open_store(&work_dir, &config)?));
//! hydrate(&store, &TracingReporter);
//!
//! let state = Arc::new(ConnectivityState::new(false));
//! let interceptor = OfflineInterceptor::new(state, store);
//! let queued = interceptor.queue_request_if_offline(request)?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod error;
pub mod storage;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat, QueueCommand};
pub use config::{find_work_dir, init_work_dir, Config};
pub use error::{Error, ErrorKind, Result};

/// Run a CLI command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { base_url, backend } => commands::init::run(base_url, backend),
        Command::Submit {
            method,
            url,
            body,
            headers,
            timeout,
            offline,
        } => commands::submit::run(&method, &url, body.as_deref(), &headers, timeout, offline),
        Command::Queue(cmd) => match cmd {
            QueueCommand::List { output } => commands::queue::list(output),
            QueueCommand::Clear => commands::queue::clear(),
        },
        Command::Check { url, method } => commands::check::run(&url, &method),
        Command::Sync => commands::sync::run(),
        Command::Status { output } => commands::status::run(output),
        Command::Daemon => commands::daemon::run(),
    }
}
