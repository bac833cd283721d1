// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::{open_context, probe_online, runtime};
use crate::error::Result;
use crate::sync::{
    hydrate, ConnectivityState, DrainOutcome, HttpApiClient, ReplayEngine, StopReason,
    TracingReporter,
};

pub fn run() -> Result<()> {
    let ctx = open_context()?;
    let client = HttpApiClient::new(&ctx.config.api.base_url, ctx.config.api.default_timeout())?;
    let reporter = Arc::new(TracingReporter);
    let hydrated = hydrate(&ctx.store, reporter.as_ref());

    let outcome = runtime()?.block_on(async {
        let online = probe_online(&ctx.config).await;
        let state = Arc::new(ConnectivityState::new(online));
        let engine = ReplayEngine::new(client, Arc::clone(&ctx.store), state, reporter);
        engine.drain().await
    });

    println!("{}", summarize(hydrated.queue.len(), &outcome));
    Ok(())
}

pub(crate) fn summarize(pending: usize, outcome: &DrainOutcome) -> String {
    match &outcome.stop {
        StopReason::Drained if pending == 0 => "Queue is empty, nothing to replay".to_string(),
        StopReason::Drained => format!("Replayed {} request(s)", outcome.delivered),
        StopReason::ItemFailed { id } => format!(
            "Replayed {} request(s); {} failed, {} remaining",
            outcome.delivered, id, outcome.remaining
        ),
        StopReason::WentOffline => format!(
            "Offline; replayed {} request(s), {} remaining",
            outcome.delivered, outcome.remaining
        ),
        StopReason::AlreadySyncing => "Replay already in progress".to_string(),
        StopReason::StorageFailed => format!(
            "Replayed {} request(s), then failed to update the queue; {} remaining",
            outcome.delivered, outcome.remaining
        ),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
