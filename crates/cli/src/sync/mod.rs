// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline mutation queue and replay.
//!
//! Mutations made while the API is unreachable are stored durably and
//! delivered in order once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Dispatcher  │────►│ Interceptor │────►│ QueueStore  │
//! │  (submit)   │     │ (offline?)  │     │  (storage)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ online                                ▲
//!        ▼                                       │ head / remove
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  ApiClient  │◄────│ReplayEngine │◄────│  Monitor    │
//! │   (trait)   │     │  (drain)    │     │ (CameOnline)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Shared connectivity state with single-writer flags
//! - Queue persisted as one JSON value in a key/value store
//! - Startup hydration that never fails
//! - Strict FIFO replay that halts on the first failure
//! - Retry drains with exponential backoff
//! - Injectable client, probe and reporter traits for testing

mod connectivity;
mod dispatch;
mod drain;
mod hydrate;
mod interceptor;
mod queue;
mod report;
mod transport;

pub use connectivity::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityProbe, ConnectivityState, HttpProbe,
    ProbeError, ProbeResult,
};
pub use dispatch::{MutationDispatcher, Submitted};
pub use drain::{DrainOutcome, ReplayEngine, ReplayScheduler, RetryPolicy, StopReason};
pub use hydrate::{hydrate, Hydrated};
pub use interceptor::OfflineInterceptor;
pub use queue::{QueueError, QueueResult, QueueStore, QUEUE_STORAGE_KEY};
pub use report::{ErrorReporter, TracingReporter};
pub use transport::{ApiClient, ApiError, ApiResponse, ApiResult, HttpApiClient};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod connectivity_tests;




#[cfg(test)]
mod interceptor_tests;
