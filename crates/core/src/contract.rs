// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The request contract: which requests may be deferred, and in what shape.
//!
//! A request is queueable when its verb mutates state and its target is a
//! mounted resource route. Read-only requests are never queued, and neither
//! are infrastructure paths (health checks, auth/session endpoints).

use crate::error::{Error, Result};
use crate::method::Method;
use crate::registry::EndpointRegistry;
use crate::request::{CanonicalRequest, RawRequest};

/// True if the URL targets a mounted resource route that is not an
/// infrastructure path.
pub fn is_mounted_mutation_route(registry: &EndpointRegistry, url: &str) -> bool {
    let Some(path) = registry.route_path(url) else {
        return false;
    };
    if registry.is_excluded(&path) {
        return false;
    }
    registry.match_route(&path).is_some()
}

/// True if the request may be deferred to the offline queue.
///
/// Fails closed: a missing or unrecognised method or URL is not queueable.
pub fn is_queueable_request(registry: &EndpointRegistry, request: &RawRequest) -> bool {
    let Some(method) = request.method.as_deref() else {
        return false;
    };
    let Ok(method) = method.parse::<Method>() else {
        return false;
    };
    let Some(url) = request.url.as_deref() else {
        return false;
    };
    method.is_mutating() && is_mounted_mutation_route(registry, url)
}

/// Projects a request down to its canonical `{url, method, body, headers,
/// timeout}` shape, uppercasing the method and dropping everything else.
///
/// Header values are carried over as-is.
pub fn sanitize_queue_request(request: &RawRequest) -> Result<CanonicalRequest> {
    let url = request
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or(Error::MissingField("url"))?;
    let method: Method = request
        .method
        .as_deref()
        .ok_or(Error::MissingField("method"))?
        .parse()?;

    Ok(CanonicalRequest {
        url: url.to_string(),
        method,
        body: request.body.clone(),
        headers: request.headers.clone(),
        timeout: request.timeout,
    })
}

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
