// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use cq_core::QueuedRequest;
use serde::Serialize;

use super::{open_context, probe_online, runtime};
use crate::cli::OutputFormat;
use crate::error::Result;

/// Snapshot reported by `cq status`.
#[derive(Debug, Serialize)]
pub(crate) struct Status {
    pub online: bool,
    pub api: String,
    pub pending: usize,
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
    pub oldest_age_secs: Option<i64>,
}

impl Status {
    pub(crate) fn new(
        online: bool,
        api: &str,
        queue: &[QueuedRequest],
        now: DateTime<Utc>,
    ) -> Self {
        let oldest = queue.first().map(|item| item.enqueued_at);
        Status {
            online,
            api: api.to_string(),
            pending: queue.len(),
            oldest_enqueued_at: oldest,
            oldest_age_secs: oldest.map(|at| (now - at).num_seconds().max(0)),
        }
    }

    pub(crate) fn render_text(&self) -> String {
        let mut out = format!(
            "API: {} ({})\nPending: {}\n",
            self.api,
            if self.online { "online" } else { "offline" },
            self.pending
        );
        if let Some(age) = self.oldest_age_secs {
            out.push_str(&format!("Oldest: {} ago\n", format_age(age)));
        }
        out
    }
}

fn format_age(secs: i64) -> String {
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h {}m", s / 3600, (s % 3600) / 60),
        s => format!("{}d {}h", s / 86_400, (s % 86_400) / 3600),
    }
}

pub fn run(output: OutputFormat) -> Result<()> {
    let ctx = open_context()?;
    let queue = ctx.store.get_queue();
    let online = runtime()?.block_on(probe_online(&ctx.config));
    let status = Status::new(online, &ctx.config.api.base_url, &queue, Utc::now());

    match output {
        OutputFormat::Text => print!("{}", status.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
