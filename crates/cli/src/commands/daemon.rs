// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground replay daemon.
//!
//! Hydrates the queue, polls connectivity, and drains the queue on every
//! offline→online transition until interrupted. One daemon per project is
//! enforced with a lock file in `.carequeue/`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{open_context, probe_online, Context};
use crate::error::{Error, Result};
use crate::sync::{
    hydrate, ConnectivityMonitor, ConnectivityState, HttpApiClient, HttpProbe, ReplayEngine,
    ReplayScheduler, RetryPolicy, TracingReporter,
};

/// Log filename within the project directory.
const LOG_NAME: &str = "daemon.log";
/// PID filename within the project directory.
const PID_NAME: &str = "daemon.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "daemon.lock";

pub fn run() -> Result<()> {
    let ctx = open_context()?;

    setup_logging(&ctx.work_dir.join(LOG_NAME));
    tracing::info!("cq daemon starting, work_dir={}", ctx.work_dir.display());

    let lock_file = acquire_lock(&ctx.work_dir.join(LOCK_NAME))?;
    let pid_path = ctx.work_dir.join(PID_NAME);
    write_pid_file(&pid_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(ctx));

    let _ = fs::remove_file(&pid_path);
    drop(lock_file);
    tracing::info!("cq daemon stopped");
    result
}

async fn serve(ctx: Context) -> Result<()> {
    let reporter = Arc::new(TracingReporter);
    let hydrated = hydrate(&ctx.store, reporter.as_ref());

    let online = probe_online(&ctx.config).await;
    let state = Arc::new(ConnectivityState::new(online));
    println!(
        "Watching {} ({}), {} request(s) queued",
        ctx.config.api.base_url,
        state.status_string(),
        hydrated.queue.len()
    );

    let probe_url = ctx.config.probe_url()?;
    let probe = HttpProbe::new(probe_url.as_str(), ctx.config.connectivity.probe_timeout())
        .map_err(|e| Error::Config(e.to_string()))?;
    let client = HttpApiClient::new(&ctx.config.api.base_url, ctx.config.api.default_timeout())?;
    let engine = Arc::new(ReplayEngine::new(
        client,
        Arc::clone(&ctx.store),
        Arc::clone(&state),
        reporter,
    ));

    let cancel = CancellationToken::new();
    let monitor = ConnectivityMonitor::new(Arc::clone(&state));
    let events = monitor.spawn_polling(
        probe,
        ctx.config.connectivity.probe_interval(),
        cancel.clone(),
    );

    let (manual_tx, manual_rx) = mpsc::channel(1);
    if online && !hydrated.queue.is_empty() {
        let _ = manual_tx.try_send(());
    }

    let scheduler = ReplayScheduler::new(engine, RetryPolicy::from_config(&ctx.config.replay))
        .refresh_before_drain(true);
    let scheduler_task = tokio::spawn(scheduler.run(events, manual_rx, cancel.clone()));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("interrupt received, shutting down"),
        Err(e) => tracing::error!("failed to listen for interrupt: {}", e),
    }
    cancel.cancel();
    drop(manual_tx);

    if let Err(e) = scheduler_task.await {
        tracing::error!("replay scheduler panicked: {}", e);
    }
    Ok(())
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive().map_err(|_| {
        Error::Config("another cq daemon is already running for this project".to_string())
    })?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
