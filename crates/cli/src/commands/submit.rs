// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use cq_core::RawRequest;
use serde_json::Value;

use super::{open_context, probe_online, runtime};
use crate::error::Result;
use crate::sync::{
    ConnectivityState, HttpApiClient, MutationDispatcher, OfflineInterceptor, Submitted,
};

pub fn run(
    method: &str,
    url: &str,
    body: Option<&str>,
    headers: &[(String, String)],
    timeout: Option<u64>,
    offline: bool,
) -> Result<()> {
    let ctx = open_context()?;
    let raw = build_request(method, url, body, headers, timeout)?;
    let registry = Arc::new(ctx.config.registry()?);
    let client = HttpApiClient::new(&ctx.config.api.base_url, ctx.config.api.default_timeout())?;

    let submitted = runtime()?.block_on(async {
        let online = !offline && probe_online(&ctx.config).await;
        let state = Arc::new(ConnectivityState::new(online));
        let interceptor = OfflineInterceptor::new(state, Arc::clone(&ctx.store));
        let dispatcher = MutationDispatcher::new(client, registry, interceptor);
        dispatcher.submit(&raw).await
    })?;

    match submitted {
        Submitted::Sent(status) => println!("Sent ({})", status),
        Submitted::Queued => {
            let pending = ctx.store.len();
            match ctx.store.snapshot().last() {
                Some(item) => println!("Queued {} ({} pending)", item.id, pending),
                None => println!("Queued ({} pending)", pending),
            }
        }
    }
    Ok(())
}

/// Builds the request descriptor from command-line parts.
pub(crate) fn build_request(
    method: &str,
    url: &str,
    body: Option<&str>,
    headers: &[(String, String)],
    timeout: Option<u64>,
) -> Result<RawRequest> {
    let mut raw = RawRequest::new(method, url);
    if let Some(body) = body {
        raw = raw.with_body(serde_json::from_str::<Value>(body)?);
    }
    for (name, value) in headers {
        raw = raw.with_header(name.as_str(), value.as_str());
    }
    if let Some(timeout) = timeout {
        raw = raw.with_timeout(timeout);
    }
    Ok(raw)
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
