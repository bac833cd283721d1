// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking.
//!
//! [`ConnectivityState`] is the single shared record of whether the API is
//! reachable and whether a drain is running. Writes are split by owner:
//! only the [`ConnectivityMonitor`] flips `online`, and only the replay
//! engine's sync guard flips `syncing`. Everyone else reads.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Shared online/syncing flags.
///
/// Uses atomic fields for lock-free reads from any task.
pub struct ConnectivityState {
    online: AtomicBool,
    syncing: AtomicBool,
}

impl ConnectivityState {
    /// Create the state with the platform-reported initial reachability.
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
            syncing: AtomicBool::new(false),
        }
    }

    /// Last known reachability. Never probes.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// True exactly while a drain is in flight.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Sets reachability, returning the previous value.
    fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::AcqRel)
    }

    /// Claims the drain slot. Returns false if a drain is already running.
    pub(super) fn try_begin_sync(&self) -> bool {
        self.syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(super) fn end_sync(&self) {
        self.syncing.store(false, Ordering::Release);
    }

    /// Human-readable status line.
    pub fn status_string(&self) -> String {
        match (self.is_online(), self.is_syncing()) {
            (true, true) => "online (syncing)".to_string(),
            (true, false) => "online".to_string(),
            (false, _) => "offline".to_string(),
        }
    }
}

/// Reachability transitions published by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// offline → online. Schedules a drain.
    CameOnline,
    /// online → offline.
    WentOffline,
}

/// Error type for connectivity probes.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The platform could not determine reachability.
    #[error("connectivity probe failed: {0}")]
    Failed(String),
}

/// Result type for connectivity probes.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Source of reachability readings.
pub trait ConnectivityProbe: Send + Sync {
    /// Returns whether the API is currently reachable.
    fn probe(&self) -> Pin<Box<dyn Future<Output = ProbeResult<bool>> + Send + '_>>;
}

/// Probes reachability with a GET against the API's health path.
///
/// Any HTTP response counts as reachable; connection and timeout errors
/// count as unreachable.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: &str, timeout: Duration) -> ProbeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Failed(e.to_string()))?;
        Ok(HttpProbe {
            client,
            url: url.to_string(),
        })
    }
}

impl ConnectivityProbe for HttpProbe {
    fn probe(&self) -> Pin<Box<dyn Future<Output = ProbeResult<bool>> + Send + '_>> {
        Box::pin(async move {
            match self.client.get(&self.url).send().await {
                Ok(_) => Ok(true),
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => Ok(false),
                Err(e) => Err(ProbeError::Failed(e.to_string())),
            }
        })
    }
}

/// Owner of the `online` flag.
pub struct ConnectivityMonitor {
    state: Arc<ConnectivityState>,
}

impl ConnectivityMonitor {
    pub fn new(state: Arc<ConnectivityState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<ConnectivityState> {
        &self.state
    }

    /// Last known reachability.
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Applies a probe reading and returns the transition it caused.
    ///
    /// A failed reading keeps the last known state.
    pub fn observe(&self, reading: ProbeResult<bool>) -> Option<ConnectivityEvent> {
        let online = match reading {
            Ok(online) => online,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    online = self.is_online(),
                    "keeping last known connectivity"
                );
                return None;
            }
        };

        let was_online = self.state.set_online(online);
        match (was_online, online) {
            (false, true) => {
                tracing::info!("connectivity restored");
                Some(ConnectivityEvent::CameOnline)
            }
            (true, false) => {
                tracing::info!("connectivity lost");
                Some(ConnectivityEvent::WentOffline)
            }
            _ => None,
        }
    }

    /// Probes once and applies the reading.
    pub async fn poll_once<P: ConnectivityProbe + ?Sized>(
        &self,
        probe: &P,
    ) -> Option<ConnectivityEvent> {
        let reading = probe.probe().await;
        self.observe(reading)
    }

    /// Polls the probe in a background task, publishing transitions.
    ///
    /// The task stops when `cancel` fires or the receiver is dropped.
    pub fn spawn_polling<P>(
        self,
        probe: P,
        interval: Duration,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<ConnectivityEvent>
    where
        P: ConnectivityProbe + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }

                let reading = tokio::select! {
                    _ = cancel.cancelled() => return,
                    reading = probe.probe() => reading,
                };

                if let Some(event) = self.observe(reading) {
                    if event_tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        });

        event_rx
    }
}
