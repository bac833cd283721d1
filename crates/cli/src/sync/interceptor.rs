// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The online/offline branch every outgoing mutation passes through.

use std::sync::Arc;

use cq_core::CanonicalRequest;

use super::connectivity::ConnectivityState;
use super::queue::QueueStore;
use crate::error::{Error, Result};

/// Defers requests to the queue while offline.
///
/// Does not check queue eligibility; callers run the request contract
/// first.
pub struct OfflineInterceptor {
    state: Arc<ConnectivityState>,
    store: Arc<QueueStore>,
}

impl OfflineInterceptor {
    pub fn new(state: Arc<ConnectivityState>, store: Arc<QueueStore>) -> Self {
        OfflineInterceptor { state, store }
    }

    /// Last known reachability.
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Returns `Ok(false)` when online, leaving the caller to send.
    /// Returns `Ok(true)` when offline and the request was durably queued.
    ///
    /// Fails with [`Error::OfflineQueueFailed`] when offline and the queue
    /// could not be written; the request was neither sent nor stored.
    pub fn queue_request_if_offline(&self, request: CanonicalRequest) -> Result<bool> {
        if self.state.is_online() {
            return Ok(false);
        }

        match self.store.add_to_queue(request) {
            Ok(item) => {
                tracing::info!(
                    id = %item.id,
                    method = %item.request.method,
                    url = %item.request.url,
                    "offline, request deferred"
                );
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "offline and failed to queue request");
                Err(Error::OfflineQueueFailed(e))
            }
        }
    }
}
