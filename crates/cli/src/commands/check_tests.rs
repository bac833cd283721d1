// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    create = { "post", "/api/v1/patients", "queueable: POST /api/v1/patients (resource patients)" },
    update = { "PUT", "/api/v1/beds/12", "queueable: PUT /api/v1/beds/12 (resource beds)" },
    read = { "GET", "/api/v1/patients", "not queueable: GET /api/v1/patients (read-only method)" },
    health = { "DELETE", "/health", "not queueable: DELETE /health (infrastructure path)" },
    unmounted = { "POST", "/api/v1/unknown", "not queueable: POST /api/v1/unknown (no mounted route)" },
    other_scheme = { "POST", "ftp://his/api/v1/patients", "not queueable: POST ftp://his/api/v1/patients (unroutable url)" },
    upper_scheme = { "POST", "HTTPS://his/api/v1/patients", "queueable: POST HTTPS://his/api/v1/patients (resource patients)" },
    bogus_method = { "FETCH", "/api/v1/patients", "not queueable: FETCH /api/v1/patients (unknown method)" },
)]
fn test_describe(method: &str, url: &str, expected: &str) {
    let registry = EndpointRegistry::with_defaults().unwrap();
    assert_eq!(describe(&registry, method, url), expected);
}
