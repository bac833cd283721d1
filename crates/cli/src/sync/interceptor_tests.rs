// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the offline interceptor.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use super::connectivity::ConnectivityState;
use super::interceptor::OfflineInterceptor;
use super::test_helpers::{flaky_queue, post_patient};
use crate::error::ErrorKind;

#[test]
fn test_online_never_touches_storage() {
    let (store, control) = flaky_queue();
    let interceptor =
        OfflineInterceptor::new(Arc::new(ConnectivityState::new(true)), store.clone());

    assert!(!interceptor.queue_request_if_offline(post_patient("A")).unwrap());
    assert_eq!(control.calls(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_online_with_broken_storage_still_returns_false() {
    let (store, control) = flaky_queue();
    control.set_fail_reads(true);
    control.set_fail_writes(true);
    let interceptor = OfflineInterceptor::new(Arc::new(ConnectivityState::new(true)), store);

    assert!(!interceptor.queue_request_if_offline(post_patient("A")).unwrap());
}

#[test]
fn test_offline_queues_request() {
    let (store, control) = flaky_queue();
    let interceptor =
        OfflineInterceptor::new(Arc::new(ConnectivityState::new(false)), store.clone());

    assert!(interceptor.queue_request_if_offline(post_patient("A")).unwrap());
    assert!(control.writes() > 0);

    let queue = store.get_queue();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].request, post_patient("A"));
}

#[test]
fn test_offline_storage_failure_is_offline_queue_failed() {
    let (store, control) = flaky_queue();
    control.set_fail_writes(true);
    let interceptor =
        OfflineInterceptor::new(Arc::new(ConnectivityState::new(false)), store.clone());

    let err = interceptor
        .queue_request_if_offline(post_patient("A"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OfflineQueueFailed);

    control.set_fail_writes(false);
    assert!(store.get_queue().is_empty());
}
