// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    missing_field = { Error::MissingField("method"), "method is required" },
    invalid_method = { Error::InvalidMethod("FETCH".into()), "FETCH" },
    invalid_route = {
        Error::InvalidRoute { template: "patients".into(), reason: "must start with '/'".into() },
        "patients"
    },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn invalid_method_lists_valid_methods() {
    let msg = Error::InvalidMethod("fetch".into()).to_string();
    assert!(msg.contains("hint:"));
    assert!(msg.contains("PATCH"));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
