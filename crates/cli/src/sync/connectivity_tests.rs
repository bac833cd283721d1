// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for connectivity state and monitoring.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::connectivity::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityProbe, ConnectivityState, HttpProbe,
    ProbeError, ProbeResult,
};
use super::test_helpers::{closed_port_url, serve_once};
use tokio_util::sync::CancellationToken;
use yare::parameterized;

/// Probe that returns scripted readings, then repeats the last one.
struct ScriptedProbe {
    readings: Mutex<VecDeque<ProbeResult<bool>>>,
    last: Mutex<bool>,
}

impl ScriptedProbe {
    fn new(readings: Vec<ProbeResult<bool>>) -> Self {
        ScriptedProbe {
            readings: Mutex::new(readings.into()),
            last: Mutex::new(false),
        }
    }
}

impl ConnectivityProbe for ScriptedProbe {
    fn probe(&self) -> Pin<Box<dyn Future<Output = ProbeResult<bool>> + Send + '_>> {
        Box::pin(async move {
            let next = self.readings.lock().unwrap().pop_front();
            match next {
                Some(Ok(online)) => {
                    *self.last.lock().unwrap() = online;
                    Ok(online)
                }
                Some(Err(e)) => Err(e),
                None => Ok(*self.last.lock().unwrap()),
            }
        })
    }
}

fn failed() -> ProbeResult<bool> {
    Err(ProbeError::Failed("platform error".to_string()))
}

#[test]
fn test_state_initial_values() {
    let state = ConnectivityState::new(true);
    assert!(state.is_online());
    assert!(!state.is_syncing());
    assert_eq!(state.status_string(), "online");

    let state = ConnectivityState::new(false);
    assert!(!state.is_online());
    assert_eq!(state.status_string(), "offline");
}

#[test]
fn test_sync_slot_is_exclusive() {
    let state = ConnectivityState::new(true);
    assert!(state.try_begin_sync());
    assert!(state.is_syncing());
    assert_eq!(state.status_string(), "online (syncing)");
    assert!(!state.try_begin_sync());

    state.end_sync();
    assert!(!state.is_syncing());
    assert!(state.try_begin_sync());
}

#[parameterized(
    comes_online = { false, true, Some(ConnectivityEvent::CameOnline) },
    goes_offline = { true, false, Some(ConnectivityEvent::WentOffline) },
    stays_online = { true, true, None },
    stays_offline = { false, false, None },
)]
fn test_observe_transitions(initial: bool, reading: bool, expected: Option<ConnectivityEvent>) {
    let monitor = ConnectivityMonitor::new(Arc::new(ConnectivityState::new(initial)));
    assert_eq!(monitor.observe(Ok(reading)), expected);
    assert_eq!(monitor.is_online(), reading);
}

#[parameterized(
    while_online = { true },
    while_offline = { false },
)]
fn test_probe_error_keeps_last_state(initial: bool) {
    let monitor = ConnectivityMonitor::new(Arc::new(ConnectivityState::new(initial)));
    assert_eq!(monitor.observe(failed()), None);
    assert_eq!(monitor.is_online(), initial);
}

#[test]
fn test_monitor_shares_state() {
    let state = Arc::new(ConnectivityState::new(true));
    let monitor = ConnectivityMonitor::new(Arc::clone(&state));
    monitor.observe(Ok(false));
    assert!(!state.is_online());
    assert!(Arc::ptr_eq(monitor.state(), &state));
}

#[tokio::test]
async fn test_poll_once() {
    let monitor = ConnectivityMonitor::new(Arc::new(ConnectivityState::new(false)));
    let probe = ScriptedProbe::new(vec![Ok(true), failed(), Ok(true)]);

    assert_eq!(
        monitor.poll_once(&probe).await,
        Some(ConnectivityEvent::CameOnline)
    );
    assert_eq!(monitor.poll_once(&probe).await, None);
    assert_eq!(monitor.poll_once(&probe).await, None);
    assert!(monitor.is_online());
}

#[tokio::test(start_paused = true)]
async fn test_spawn_polling_publishes_transitions_only() {
    let state = Arc::new(ConnectivityState::new(false));
    let monitor = ConnectivityMonitor::new(Arc::clone(&state));
    let probe = ScriptedProbe::new(vec![
        Ok(false),
        Ok(true),
        Ok(true),
        failed(),
        Ok(false),
        Ok(true),
    ]);
    let cancel = CancellationToken::new();

    let mut events = monitor.spawn_polling(probe, Duration::from_secs(1), cancel.clone());

    assert_eq!(events.recv().await, Some(ConnectivityEvent::CameOnline));
    assert_eq!(events.recv().await, Some(ConnectivityEvent::WentOffline));
    assert_eq!(events.recv().await, Some(ConnectivityEvent::CameOnline));
    assert!(state.is_online());

    cancel.cancel();
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn test_http_probe_reachable() {
    let (base_url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "").await;
    let probe = HttpProbe::new(&format!("{base_url}/health"), Duration::from_secs(5)).unwrap();

    assert!(probe.probe().await.unwrap());
    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /health"), "{raw}");
}

#[tokio::test]
async fn test_http_probe_unreachable() {
    let probe = HttpProbe::new(&closed_port_url(), Duration::from_secs(5)).unwrap();
    assert!(!probe.probe().await.unwrap());
}
