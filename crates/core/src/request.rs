// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request shapes handled by the offline queue.
//!
//! - [`RawRequest`]: whatever a caller hands us, including bookkeeping
//!   fields that must never reach the server.
//! - [`CanonicalRequest`]: the exact `{url, method, body, headers, timeout}`
//!   projection that is stored and replayed.
//! - [`QueuedRequest`]: a canonical request plus queue-store metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::method::Method;

/// Header name to value mapping.
///
/// Values are usually strings but are kept as JSON so that non-string
/// values supplied by a caller pass through untouched.
pub type Headers = BTreeMap<String, Value>;

/// An arbitrary request descriptor as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Every other field (`id`, `timestamp`, caller metadata).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        RawRequest {
            url: Some(url.into()),
            method: Some(method.into()),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    /// Parses a descriptor from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<CanonicalRequest> for RawRequest {
    fn from(request: CanonicalRequest) -> Self {
        RawRequest {
            url: Some(request.url),
            method: Some(request.method.as_str().to_string()),
            body: request.body,
            headers: request.headers,
            timeout: request.timeout,
            extra: Map::new(),
        }
    }
}

/// The replayable shape of a request.
///
/// This is exactly what the HTTP client receives on replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRequest {
    pub url: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Per-request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// A deferred request as held by the queue store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedRequest {
    pub id: String,
    pub request: CanonicalRequest,
    pub enqueued_at: DateTime<Utc>,
    /// Delivery attempts made so far.
    #[serde(default)]
    pub attempts: u32,
}

impl QueuedRequest {
    pub fn new(id: String, request: CanonicalRequest, enqueued_at: DateTime<Utc>) -> Self {
        QueuedRequest {
            id,
            request,
            enqueued_at,
            attempts: 0,
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
