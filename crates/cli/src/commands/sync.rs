// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `haul sync`: flush the queue to the server.

use serde::Serialize;

use super::Device;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::{FlushReport, SyncClient};

/// What a sync did, plus whether the operator now has to step in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    #[serde(flatten)]
    pub report: FlushReport,
    pub manual_required: bool,
}

pub fn run(device: &Device, manual: bool, output: OutputFormat) -> Result<()> {
    let outcome = flush(device, manual)?;
    match output {
        OutputFormat::Text => print!("{}", format_text(&outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

/// Runs one flush on a single-threaded runtime.
pub(crate) fn flush(device: &Device, manual: bool) -> Result<SyncOutcome> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let client = SyncClient::new(device.config.sync_config(), &device.data_dir)?;
    let report = runtime.block_on(client.flush(manual))?;
    let manual_required = client.queue().is_manual_required()?;
    Ok(SyncOutcome { report, manual_required })
}

pub(crate) fn format_text(outcome: &SyncOutcome) -> String {
    let report = &outcome.report;
    if report.blocked {
        return format!(
            "Sync skipped: automatic retries are used up, {} operation(s) waiting.\n\
             Run 'haul sync --manual' to try again.\n",
            report.pending
        );
    }
    if report.sent == 0 && report.failed == 0 && report.pending == 0 {
        return "Nothing to sync.\n".to_string();
    }
    let mut text =
        format!("Sent {}, failed {}, {} pending.\n", report.sent, report.failed, report.pending);
    if outcome.manual_required {
        text.push_str("Automatic retries are used up; run 'haul sync --manual' to try again.\n");
    }
    text
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
