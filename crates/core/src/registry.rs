// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint registry: which API routes exist and are mounted.
//!
//! Each resource lists URL templates relative to the API prefix, e.g.
//! `/patients/{id}`. Placeholders (`{id}` or `:id`) match exactly one
//! path segment.

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// API base prefix stripped from request paths before matching.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Infrastructure paths that must never be queued.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    "/health",
    "/auth",
    "/session",
    "/sessions",
    "/login",
    "/logout",
    "/token",
    "/refresh",
];

/// A resource and the URL templates it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    pub name: String,
    pub routes: Vec<String>,
    /// Unmounted resources are known but not routable.
    #[serde(default = "default_mounted")]
    pub mounted: bool,
}

fn default_mounted() -> bool {
    true
}

impl Endpoint {
    /// Resource with the usual collection and member routes.
    pub fn resource(name: &str) -> Self {
        Endpoint {
            name: name.to_string(),
            routes: vec![format!("/{name}"), format!("/{name}/{{id}}")],
            mounted: true,
        }
    }
}

/// The built-in hospital resource table.
pub fn default_endpoints() -> Vec<Endpoint> {
    let mut endpoints: Vec<Endpoint> = [
        "patients",
        "admissions",
        "vitals",
        "orders",
        "prescriptions",
        "lab-results",
        "appointments",
        "discharges",
        "notes",
        "beds",
    ]
    .iter()
    .map(|name| Endpoint::resource(name))
    .collect();

    // Nested per-patient collections used by the bedside screens
    endpoints.push(Endpoint {
        name: "patient-records".to_string(),
        routes: vec![
            "/patients/{id}/vitals".to_string(),
            "/patients/{id}/notes".to_string(),
            "/patients/{id}/orders".to_string(),
        ],
        mounted: true,
    });
    endpoints
}

struct CompiledRoute {
    resource: String,
    pattern: Regex,
}

/// Lookup table of mounted routes.
pub struct EndpointRegistry {
    prefix: String,
    excluded: Vec<String>,
    routes: Vec<CompiledRoute>,
}

impl EndpointRegistry {
    /// Builds a registry from endpoint definitions.
    ///
    /// Unmounted endpoints are skipped; their templates are still validated.
    pub fn new(prefix: &str, endpoints: &[Endpoint], excluded: &[String]) -> Result<Self> {
        let mut routes = Vec::new();
        for endpoint in endpoints {
            for template in &endpoint.routes {
                let pattern = compile_template(template)?;
                if endpoint.mounted {
                    routes.push(CompiledRoute {
                        resource: endpoint.name.clone(),
                        pattern,
                    });
                }
            }
        }

        Ok(EndpointRegistry {
            prefix: normalize_prefix(prefix),
            excluded: excluded.iter().map(|p| trim_path(p)).collect(),
            routes,
        })
    }

    /// Registry with the built-in resources, prefix and exclusions.
    pub fn with_defaults() -> Result<Self> {
        let excluded: Vec<String> = DEFAULT_EXCLUDED_PATHS.iter().map(|p| p.to_string()).collect();
        Self::new(DEFAULT_API_PREFIX, &default_endpoints(), &excluded)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of mounted route templates.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Reduces a URL to the route path used for matching.
    ///
    /// Drops scheme and host, query and fragment, the API prefix, and
    /// any trailing slash. `None` if the URL does not parse or is not
    /// http(s).
    pub fn route_path(&self, url: &str) -> Option<String> {
        let path = trim_path(&url_path(url)?);
        if self.prefix.is_empty() {
            return Some(path);
        }
        if path == self.prefix {
            return Some("/".to_string());
        }
        match path.strip_prefix(&self.prefix) {
            Some(rest) if rest.starts_with('/') => Some(rest.to_string()),
            _ => Some(path),
        }
    }

    /// True if the path falls under a fixed infrastructure path.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|ex| {
            path == ex
                || path
                    .strip_prefix(ex.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Name of the mounted resource serving this path, if any.
    pub fn match_route(&self, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.pattern.is_match(path))
            .map(|r| r.resource.as_str())
    }
}

/// Origin that relative URLs are resolved against before matching.
const RELATIVE_ORIGIN: &str = "http://relative.invalid/";

/// Extracts the path component of an absolute or relative URL.
fn url_path(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = match Url::parse(url) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_ORIGIN).ok()?.join(url).ok()?
        }
        Err(_) => return None,
    };
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.path().to_string())
}

/// Ensures a leading slash and strips trailing ones.
fn trim_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = trim_path(prefix);
    if trimmed == "/" {
        String::new()
    } else {
        trimmed
    }
}

fn compile_template(template: &str) -> Result<Regex> {
    let invalid = |reason: &str| Error::InvalidRoute {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    if !template.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let mut pattern = String::from("^");
    for segment in template.trim_end_matches('/').split('/').skip(1) {
        pattern.push('/');
        if segment.is_empty() {
            return Err(invalid("empty path segment"));
        }
        let braced = segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2;
        let is_placeholder = braced || (segment.starts_with(':') && segment.len() > 1);
        if is_placeholder {
            pattern.push_str("[^/]+");
        } else if segment.contains(['{', '}']) {
            return Err(invalid("unbalanced placeholder"));
        } else {
            pattern.push_str(&regex::escape(segment));
        }
    }
    if pattern == "^" {
        pattern.push('/');
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
