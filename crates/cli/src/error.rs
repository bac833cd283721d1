// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::storage::StorageError;
use crate::sync::{ApiError, QueueError};

/// All possible errors that can occur in the cqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'cq init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("request cannot be queued offline: {method} {url}\n  hint: only mutations on mounted resource routes can be deferred; retry when online")]
    ValidationRejected { method: String, url: String },

    #[error("offline and failed to queue request: {0}\n  hint: the write was not sent and not stored")]
    OfflineQueueFailed(QueueError),

    #[error("failed to hydrate offline queue: {0}")]
    HydrationFailed(QueueError),

    #[error("replay of {id} failed: {source}")]
    ReplayFailed { id: String, source: ApiError },

    #[error("{0}")]
    Request(#[from] cq_core::Error),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Coarse classification used by callers and the error reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request not eligible for queueing.
    ValidationRejected,
    /// Offline, and durable enqueue failed.
    OfflineQueueFailed,
    /// Storage unreadable at startup (recovered).
    HydrationFailed,
    /// A delivery attempt during drain failed (recovered).
    ReplayFailed,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationRejected => "VALIDATION_REJECTED",
            ErrorKind::OfflineQueueFailed => "OFFLINE_QUEUE_FAILED",
            ErrorKind::HydrationFailed => "HYDRATION_FAILED",
            ErrorKind::ReplayFailed => "REPLAY_FAILED",
            ErrorKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ValidationRejected { .. } => ErrorKind::ValidationRejected,
            Error::OfflineQueueFailed(_) => ErrorKind::OfflineQueueFailed,
            Error::HydrationFailed(_) => ErrorKind::HydrationFailed,
            Error::ReplayFailed { .. } => ErrorKind::ReplayFailed,
            _ => ErrorKind::Other,
        }
    }
}

/// A specialized Result type for cqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
