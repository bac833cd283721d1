// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay of queued requests.
//!
//! A drain walks the queue from the head, delivering one item at a time.
//! Delivered items are removed; the first failure leaves its item in place
//! and ends the drain so nothing is ever delivered ahead of an older
//! pending item. Only one drain runs at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::connectivity::{ConnectivityEvent, ConnectivityState};
use super::queue::QueueStore;
use super::report::ErrorReporter;
use super::transport::ApiClient;
use crate::config::ReplayConfig;
use crate::error::Error;

/// Context string passed to the reporter on replay failures.
pub const REPLAY_CONTEXT: &str = "offline queue replay";

/// Why a drain stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The queue is empty.
    Drained,
    /// Delivery of the head item failed; it stays queued.
    ItemFailed { id: String },
    /// Connectivity was lost between items.
    WentOffline,
    /// Another drain was already running. Nothing was attempted.
    AlreadySyncing,
    /// A delivered item could not be removed from storage.
    StorageFailed,
}

/// Summary of one drain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOutcome {
    pub delivered: usize,
    pub remaining: usize,
    pub stop: StopReason,
}

/// Holds the drain slot; releases it on drop.
struct SyncGuard<'a> {
    state: &'a ConnectivityState,
}

impl<'a> SyncGuard<'a> {
    fn acquire(state: &'a ConnectivityState) -> Option<Self> {
        state.try_begin_sync().then(|| SyncGuard { state })
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.state.end_sync();
    }
}

/// Delivers queued requests through an [`ApiClient`].
pub struct ReplayEngine<C: ApiClient> {
    client: C,
    store: Arc<QueueStore>,
    state: Arc<ConnectivityState>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<C: ApiClient> ReplayEngine<C> {
    pub fn new(
        client: C,
        store: Arc<QueueStore>,
        state: Arc<ConnectivityState>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        ReplayEngine {
            client,
            store,
            state,
            reporter,
        }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    pub fn state(&self) -> &Arc<ConnectivityState> {
        &self.state
    }

    /// Runs one drain over the store's in-memory view.
    pub async fn drain(&self) -> DrainOutcome {
        let Some(_guard) = SyncGuard::acquire(&self.state) else {
            tracing::debug!("drain already in progress");
            return self.outcome(0, StopReason::AlreadySyncing);
        };

        let mut delivered = 0;
        loop {
            if !self.state.is_online() {
                tracing::info!(delivered, "connectivity lost, stopping drain");
                return self.outcome(delivered, StopReason::WentOffline);
            }

            let Some(item) = self.store.head() else {
                if delivered > 0 {
                    tracing::info!(delivered, "offline queue drained");
                }
                return self.outcome(delivered, StopReason::Drained);
            };

            match self.client.send(&item.request).await {
                Ok(response) => {
                    tracing::debug!(id = %item.id, status = response.status, "replayed request");
                    if let Err(e) = self.store.remove_from_queue(&item.id) {
                        self.reporter.handle_error(&Error::Queue(e), REPLAY_CONTEXT);
                        return self.outcome(delivered, StopReason::StorageFailed);
                    }
                    delivered += 1;
                }
                Err(source) => {
                    match self.store.record_attempt(&item.id) {
                        Ok(attempts) => {
                            tracing::warn!(
                                id = %item.id,
                                attempts = attempts.unwrap_or(0),
                                "replay failed, halting drain"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                id = %item.id,
                                error = %e,
                                "failed to record replay attempt"
                            );
                        }
                    }
                    let id = item.id;
                    self.reporter.handle_error(
                        &Error::ReplayFailed {
                            id: id.clone(),
                            source,
                        },
                        REPLAY_CONTEXT,
                    );
                    return self.outcome(delivered, StopReason::ItemFailed { id });
                }
            }
        }
    }

    fn outcome(&self, delivered: usize, stop: StopReason) -> DrainOutcome {
        DrainOutcome {
            delivered,
            remaining: self.store.len(),
            stop,
        }
    }
}

/// Exponential backoff between retry drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl RetryPolicy {
    pub fn new(initial: Duration, max: Duration) -> Self {
        RetryPolicy {
            initial,
            max: max.max(initial),
        }
    }

    pub fn from_config(config: &ReplayConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_retry_delay_ms),
            Duration::from_millis(config.max_retry_delay_ms),
        )
    }

    /// Delay after `previous`, doubling up to the cap.
    pub fn next_delay(&self, previous: Option<Duration>) -> Duration {
        match previous {
            None => self.initial,
            Some(d) => std::cmp::min(d.saturating_mul(2), self.max),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ReplayConfig::default())
    }
}

/// Event loop that decides when to drain.
///
/// Drains on every offline→online transition and every manual trigger.
/// After a failed drain, while still online, a retry drain is scheduled
/// with exponential backoff; a clean drain or going offline resets it.
pub struct ReplayScheduler<C: ApiClient> {
    engine: Arc<ReplayEngine<C>>,
    policy: RetryPolicy,
    refresh: bool,
}

impl<C: ApiClient> ReplayScheduler<C> {
    pub fn new(engine: Arc<ReplayEngine<C>>, policy: RetryPolicy) -> Self {
        ReplayScheduler {
            engine,
            policy,
            refresh: false,
        }
    }

    /// Re-read storage before each drain. Needed when other processes
    /// append to the same queue.
    pub fn refresh_before_drain(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Runs until cancelled or the event channel closes.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<ConnectivityEvent>,
        mut manual: mpsc::Receiver<()>,
        cancel: CancellationToken,
    ) {
        let mut backoff: Option<Duration> = None;
        let mut retry_at: Option<Instant> = None;

        loop {
            let retry = async move {
                match retry_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("replay scheduler cancelled");
                    return;
                }
                event = events.recv() => match event {
                    Some(ConnectivityEvent::CameOnline) => {}
                    Some(ConnectivityEvent::WentOffline) => {
                        backoff = None;
                        retry_at = None;
                        continue;
                    }
                    None => {
                        tracing::debug!("connectivity events closed, stopping scheduler");
                        return;
                    }
                },
                Some(()) = manual.recv() => {
                    tracing::debug!("manual drain requested");
                }
                _ = retry => {
                    tracing::debug!("retrying drain");
                }
            }

            retry_at = None;
            if self.refresh {
                self.engine.store().get_queue();
            }

            let outcome = self.engine.drain().await;
            match &outcome.stop {
                StopReason::Drained | StopReason::WentOffline => backoff = None,
                StopReason::AlreadySyncing => {}
                StopReason::ItemFailed { .. } | StopReason::StorageFailed => {
                    if self.engine.state().is_online() {
                        let delay = self.policy.next_delay(backoff);
                        tracing::info!(
                            delay_ms = delay.as_millis() as u64,
                            remaining = outcome.remaining,
                            "scheduling retry drain"
                        );
                        backoff = Some(delay);
                        retry_at = Some(Instant::now() + delay);
                    }
                }
            }
        }
    }
}
