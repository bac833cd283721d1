// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Startup hydration of the offline queue.

use cq_core::QueuedRequest;

use super::queue::QueueStore;
use super::report::ErrorReporter;
use crate::error::Error;

/// Context string passed to the reporter on hydration failure.
pub const HYDRATE_CONTEXT: &str = "offline queue hydration";

/// Result of hydrating the queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydrated {
    pub queue: Vec<QueuedRequest>,
}

/// Loads the persisted queue into the store's in-memory view.
///
/// Never fails: an unreadable queue is reported and hydrates as empty.
pub fn hydrate(store: &QueueStore, reporter: &dyn ErrorReporter) -> Hydrated {
    match store.try_get_queue() {
        Ok(queue) => {
            tracing::info!(count = queue.len(), "hydrated offline queue");
            Hydrated { queue }
        }
        Err(e) => {
            reporter.handle_error(&Error::HydrationFailed(e), HYDRATE_CONTEXT);
            store.seed(Vec::new());
            Hydrated { queue: Vec::new() }
        }
    }
}
