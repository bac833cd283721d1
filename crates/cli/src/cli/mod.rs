// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::StorageBackend;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Parse a `name=value` header argument.
fn header_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{}'", s)),
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "cq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline mutation queue for the ward API")]
#[command(
    long_about = "Offline mutation queue for the ward API.\n\n\
    Writes made while the API is unreachable are stored durably and replayed in order once it is back."
)]
pub struct Cli {
    /// Run as if cq was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Initialize a queue in the current directory
    #[command(after_help = "\
Examples:
  cq init                                    Defaults (file storage, localhost API)
  cq init --base-url https://ward.example    Point at a different API
  cq init --backend sqlite                   Store the queue in SQLite")]
    Init {
        /// API base url
        #[arg(long, value_parser = non_empty_string)]
        base_url: Option<String>,

        /// Queue storage backend
        #[arg(long, value_enum)]
        backend: Option<StorageBackend>,
    },

    /// Send a mutation, or queue it if the API is unreachable
    #[command(after_help = "\
Examples:
  cq submit -X POST -u /api/v1/patients -d '{\"name\":\"Jane Doe\"}'
  cq submit -X DELETE -u /api/v1/beds/12 --offline
  cq submit -X PATCH -u /api/v1/orders/3 -H X-Ward=B2 -d '{\"dose\":2}'")]
    Submit {
        /// HTTP method
        #[arg(long, short = 'X', value_parser = non_empty_string)]
        method: String,

        /// Request url, relative to the API base url or absolute
        #[arg(long, short = 'u', value_parser = non_empty_string)]
        url: String,

        /// JSON request body
        #[arg(long, short = 'd')]
        body: Option<String>,

        /// Request header as name=value (repeatable)
        #[arg(long = "header", short = 'H', value_parser = header_pair)]
        headers: Vec<(String, String)>,

        /// Request timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Skip the connectivity probe and treat the API as unreachable
        #[arg(long)]
        offline: bool,
    },

    /// Inspect or clear the offline queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Report whether a request could be queued offline
    #[command(after_help = "\
Examples:
  cq check /api/v1/patients              POST by default
  cq check /api/v1/patients/4 -X GET     Reads are never queueable
  cq check /health -X DELETE             Infrastructure paths are never queueable")]
    Check {
        /// Request url
        url: String,

        /// HTTP method
        #[arg(long, short = 'X', default_value = "POST")]
        method: String,
    },

    /// Replay the queue now if the API is reachable
    Sync,

    /// Show connectivity and queue state
    Status {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Watch connectivity and replay the queue whenever the API comes back
    Daemon,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum QueueCommand {
    /// List queued requests, oldest first
    List {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Remove every queued request
    Clear,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
