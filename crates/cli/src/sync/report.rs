// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error reporting for failures that are recovered rather than returned.

use crate::error::Error;

/// Receives errors that subsystems absorb instead of propagating.
pub trait ErrorReporter: Send + Sync {
    fn handle_error(&self, error: &Error, context: &str);
}

/// Reports errors as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn handle_error(&self, error: &Error, context: &str) {
        tracing::error!(kind = %error.kind(), context, error = %error, "recovered error");
    }
}
