// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use cq_core::QueuedRequest;

use super::open_context;
use crate::cli::OutputFormat;
use crate::error::Result;

pub fn list(output: OutputFormat) -> Result<()> {
    let ctx = open_context()?;
    let queue = ctx.store.try_get_queue()?;
    print!("{}", render(&queue, output)?);
    Ok(())
}

pub fn clear() -> Result<()> {
    let ctx = open_context()?;
    let count = ctx.store.clear()?;
    println!("Cleared {} queued request(s)", count);
    Ok(())
}

pub(crate) fn render(queue: &[QueuedRequest], output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(queue)?)),
        OutputFormat::Text => {
            if queue.is_empty() {
                return Ok("Queue is empty\n".to_string());
            }
            Ok(queue.iter().map(format_item).collect())
        }
    }
}

fn format_item(item: &QueuedRequest) -> String {
    let mut line = format!(
        "{}  {} {}  queued {}",
        item.id,
        item.request.method,
        item.request.url,
        item.enqueued_at.format("%Y-%m-%d %H:%M:%S")
    );
    if item.attempts > 0 {
        line.push_str(&format!("  attempts={}", item.attempts));
    }
    line.push('\n');
    line
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
