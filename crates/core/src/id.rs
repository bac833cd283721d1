// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::request::CanonicalRequest;

/// Prefix of every queue item id.
pub const QUEUE_ID_PREFIX: &str = "q";

/// Generate a queue item ID from the request target and enqueue time.
/// Format: q-{hash} where hash is first 8 hex chars of SHA256(method + url + timestamp)
pub fn generate_queue_id(request: &CanonicalRequest, enqueued_at: &DateTime<Utc>) -> String {
    let input = format!(
        "{}{}{}",
        request.method,
        request.url,
        enqueued_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
    );
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}-{}", QUEUE_ID_PREFIX, short_hash)
}

/// Generate a unique queue ID, handling collisions by appending an incrementing suffix.
pub fn generate_unique_queue_id<F>(
    request: &CanonicalRequest,
    enqueued_at: &DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_queue_id(request, enqueued_at);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
