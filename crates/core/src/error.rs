// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cq-core operations.

use thiserror::Error;

/// All possible errors that can occur in cq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid HTTP method: '{0}'\n  hint: valid methods are: GET, HEAD, OPTIONS, POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),

    #[error("invalid route template '{template}': {reason}")]
    InvalidRoute { template: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for cq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
