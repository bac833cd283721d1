// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use cq_core::{is_queueable_request, EndpointRegistry, Method, RawRequest};

use crate::config::{find_work_dir, Config};
use crate::error::Result;

pub fn run(url: &str, method: &str) -> Result<()> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let registry = config.registry()?;
    println!("{}", describe(&registry, method, url));
    Ok(())
}

/// One-line verdict on whether the request could be deferred.
pub(crate) fn describe(registry: &EndpointRegistry, method: &str, url: &str) -> String {
    let raw = RawRequest::new(method, url);
    let label = format!("{} {}", method.trim().to_uppercase(), url);

    if is_queueable_request(registry, &raw) {
        let resource = registry
            .route_path(url)
            .and_then(|path| registry.match_route(&path).map(str::to_string))
            .unwrap_or_default();
        return format!("queueable: {} (resource {})", label, resource);
    }

    let reason = match method.parse::<Method>() {
        Err(_) => "unknown method".to_string(),
        Ok(m) if !m.is_mutating() => "read-only method".to_string(),
        Ok(_) => match registry.route_path(url) {
            None => "unroutable url".to_string(),
            Some(path) if registry.is_excluded(&path) => "infrastructure path".to_string(),
            Some(_) => "no mounted route".to_string(),
        },
    };
    format!("not queueable: {} ({})", label, reason)
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
