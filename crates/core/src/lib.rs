// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cq-core: Shared library for the carequeue offline mutation queue
//!
//! This crate provides the I/O-free pieces of the queue: the request
//! contract that decides which mutations may be deferred, the canonical
//! storable request shape, the endpoint registry, and queue item ids.

pub mod contract;
pub mod error;
pub mod id;
pub mod method;
pub mod registry;
pub mod request;

pub use contract::{is_mounted_mutation_route, is_queueable_request, sanitize_queue_request};
pub use error::{Error, Result};
pub use method::Method;
pub use registry::{Endpoint, EndpointRegistry};
pub use request::{CanonicalRequest, Headers, QueuedRequest, RawRequest};
