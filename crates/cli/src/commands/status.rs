// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use haul_core::PendingOperation;
use serde::Serialize;

use super::Device;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::SyncMode;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub server_url: String,
    pub device_id: String,
    pub mode: SyncMode,
    pub pending: usize,
    pub auto_retries_done: u32,
    pub max_auto_retries: u32,
    pub manual_required: bool,
    pub operations: Vec<PendingOperation>,
}

pub fn run(device: &Device, output: OutputFormat) -> Result<()> {
    let report = collect(device)?;
    match output {
        OutputFormat::Text => print!("{}", format_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

pub(crate) fn collect(device: &Device) -> Result<StatusReport> {
    let queue = device.queue()?;
    let operations = queue.snapshot()?;
    let state = queue.sync_state()?;
    Ok(StatusReport {
        server_url: device.config.server_url.clone(),
        device_id: device.config.device_id.clone(),
        mode: device.config.mode,
        pending: operations.len(),
        auto_retries_done: state.auto_retries_done,
        max_auto_retries: device.config.max_auto_retries,
        manual_required: state.manual_required,
        operations,
    })
}

pub(crate) fn format_text(report: &StatusReport) -> String {
    let mut lines = vec![
        format!("Server: {}", report.server_url),
        format!("Device: {}", report.device_id),
        format!("Mode: {}", report.mode.as_str()),
        format!("Pending: {}", report.pending),
        format!("Automatic retries: {}/{}", report.auto_retries_done, report.max_auto_retries),
        format!("Manual sync required: {}", if report.manual_required { "yes" } else { "no" }),
    ];
    if !report.operations.is_empty() {
        lines.push(String::new());
        for op in &report.operations {
            lines.push(format!(
                "  {}  {}  {}",
                op.id,
                op.operation,
                op.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
