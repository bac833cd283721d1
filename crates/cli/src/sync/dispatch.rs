// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for outgoing mutations.

use std::sync::Arc;

use cq_core::{is_queueable_request, sanitize_queue_request, EndpointRegistry, RawRequest};

use super::interceptor::OfflineInterceptor;
use super::transport::ApiClient;
use crate::error::{Error, Result};

/// What happened to a submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// Delivered immediately; carries the response status.
    Sent(u16),
    /// Offline; durably queued for replay.
    Queued,
}

/// Sends mutations when online and defers them when offline.
///
/// Eligibility is checked only on the offline path. Online requests go
/// straight to the client whatever their route.
pub struct MutationDispatcher<C: ApiClient> {
    client: C,
    registry: Arc<EndpointRegistry>,
    interceptor: OfflineInterceptor,
}

impl<C: ApiClient> MutationDispatcher<C> {
    pub fn new(
        client: C,
        registry: Arc<EndpointRegistry>,
        interceptor: OfflineInterceptor,
    ) -> Self {
        MutationDispatcher {
            client,
            registry,
            interceptor,
        }
    }

    pub async fn submit(&self, raw: &RawRequest) -> Result<Submitted> {
        if !self.interceptor.is_online() && !is_queueable_request(&self.registry, raw) {
            return Err(Error::ValidationRejected {
                method: raw.method.clone().unwrap_or_default().trim().to_uppercase(),
                url: raw.url.clone().unwrap_or_default(),
            });
        }

        let request = sanitize_queue_request(raw)?;

        if self.interceptor.queue_request_if_offline(request.clone())? {
            return Ok(Submitted::Queued);
        }

        let response = self.client.send(&request).await?;
        Ok(Submitted::Sent(response.status))
    }
}
