// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync client for draining the offline queue to the server.
//!
//! A flush:
//! 1. consults the retry policy, refusing spent automatic flushes outright
//! 2. snapshots the queue and sends it (per item, or in bulk batches)
//! 3. removes only what the server acknowledged
//! 4. records the outcome in the retry state
//!
//! Network failures never escape a flush; they leave items queued and count
//! against the retry budget. Only local file errors are returned.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use haul_core::{BulkSyncRequest, OpId, PendingOperation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::queue::{OfflineQueue, QueueError};
use super::state::{Decision, MAX_AUTO_RETRIES};
use super::transport::{HttpTransport, ItemRequest, Transport, TransportError};

/// Default bound on every outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of operations per bulk request; the server's default limit.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// How the queue is sent to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// One request per operation, on the operation's own endpoint.
    #[default]
    PerItem,
    /// The queue in `POST /sync/bulk` batches of at most `max_batch_size`.
    Bulk,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::PerItem => "per_item",
            SyncMode::Bulk => "bulk",
        }
    }
}

/// Configuration for the sync client.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the server.
    pub server_url: String,
    /// Sent with bulk batches so the server can attribute them.
    pub device_id: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Automatic flushes allowed to leave work behind before escalating.
    pub max_auto_retries: u32,
    pub mode: SyncMode,
    /// Operations per bulk request; at least one.
    pub max_batch_size: usize,
    pub api_key: Option<String>,
}

impl SyncConfig {
    pub fn new(server_url: impl Into<String>, device_id: impl Into<String>) -> Self {
        SyncConfig {
            server_url: server_url.into(),
            device_id: device_id.into(),
            timeout: DEFAULT_TIMEOUT,
            max_auto_retries: MAX_AUTO_RETRIES,
            mode: SyncMode::default(),
            max_batch_size: DEFAULT_BATCH_SIZE,
            api_key: None,
        }
    }
}

/// Error type for sync client operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Queue or state file error.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The transport could not be constructed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for sync client operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    /// Operations acknowledged by the server and removed.
    pub sent: usize,
    /// Operations attempted but left queued.
    pub failed: usize,
    /// Operations still queued after the flush.
    pub pending: usize,
    /// The flush was refused because the automatic retries are spent.
    pub blocked: bool,
}

impl FlushReport {
    fn blocked(pending: usize) -> Self {
        FlushReport { sent: 0, failed: 0, pending, blocked: true }
    }
}

/// Sync client owning the queue and the transport.
pub struct SyncClient<T: Transport = HttpTransport> {
    config: SyncConfig,
    transport: T,
    queue: OfflineQueue,
}

impl SyncClient<HttpTransport> {
    /// Create a client with the HTTP transport over the queue in `data_dir`.
    pub fn new(config: SyncConfig, data_dir: &Path) -> SyncResult<Self> {
        let transport =
            HttpTransport::new(&config.server_url, config.timeout, config.api_key.clone())?;
        let queue = OfflineQueue::open(data_dir, &config.device_id)?;
        Ok(SyncClient { config, transport, queue })
    }
}

impl<T: Transport> SyncClient<T> {
    /// Create a client with a custom transport (for testing).
    pub fn with_transport(config: SyncConfig, transport: T, queue: OfflineQueue) -> Self {
        SyncClient { config, transport, queue }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Flushes the queue in the configured mode.
    pub async fn flush(&self, is_manual: bool) -> SyncResult<FlushReport> {
        self.flush_with(is_manual, self.config.mode).await
    }

    /// Flushes one request per operation.
    pub async fn flush_per_item(&self, is_manual: bool) -> SyncResult<FlushReport> {
        self.flush_with(is_manual, SyncMode::PerItem).await
    }

    /// Flushes the queue in bulk batches.
    pub async fn flush_bulk(&self, is_manual: bool) -> SyncResult<FlushReport> {
        self.flush_with(is_manual, SyncMode::Bulk).await
    }

    async fn flush_with(&self, is_manual: bool, mode: SyncMode) -> SyncResult<FlushReport> {
        let max = self.config.max_auto_retries;
        if self.queue.sync_state()?.check(is_manual, max) == Decision::Blocked {
            let pending = self.queue.len()?;
            info!(pending, "automatic sync skipped, manual sync required");
            return Ok(FlushReport::blocked(pending));
        }

        let ops = self.queue.snapshot()?;
        if ops.is_empty() {
            self.queue.reset_sync_state()?;
            debug!("queue empty, nothing to sync");
            return Ok(FlushReport::default());
        }

        let acked = match mode {
            SyncMode::PerItem => self.send_per_item(&ops).await,
            SyncMode::Bulk => self.send_bulk(&ops).await,
        };
        let failed = ops.len() - acked.len();

        let (pending, state) = self.queue.settle(&acked, |state, remaining| {
            state.after_flush(is_manual, remaining, max)
        })?;

        info!(sent = acked.len(), failed, pending, manual = is_manual, "sync finished");
        if state.manual_required {
            warn!(
                attempts = state.auto_retries_done,
                "automatic sync attempts exhausted, run a manual sync"
            );
        }

        Ok(FlushReport { sent: acked.len(), failed, pending, blocked: false })
    }

    /// Sends each operation on its own endpoint, continuing past failures.
    async fn send_per_item(&self, ops: &[PendingOperation]) -> Vec<OpId> {
        let mut acked = Vec::with_capacity(ops.len());
        for op in ops {
            let request = match ItemRequest::for_operation(op) {
                Ok(request) => request,
                Err(e) => {
                    warn!(id = %op.id, error = %e, "queued operation no longer parses, keeping it");
                    continue;
                }
            };
            let path = request.path.clone();
            match self.transport.send(request).await {
                Ok(200 | 201) => {
                    debug!(id = %op.id, %path, "sent");
                    acked.push(op.id);
                }
                Ok(status) => warn!(id = %op.id, %path, status, "server rejected operation"),
                Err(e) => warn!(id = %op.id, %path, error = %e, "send failed"),
            }
        }
        acked
    }

    /// Sends the snapshot in batches, continuing past a failed batch.
    async fn send_bulk(&self, ops: &[PendingOperation]) -> Vec<OpId> {
        let size = self.config.max_batch_size.max(1);
        let mut acked = Vec::with_capacity(ops.len());
        for (index, batch) in ops.chunks(size).enumerate() {
            debug!(batch = index + 1, count = batch.len(), "sending bulk batch");
            acked.extend(self.send_batch(batch).await);
        }
        acked
    }

    /// Sends one batch; only acknowledged refs count as sent.
    async fn send_batch(&self, ops: &[PendingOperation]) -> Vec<OpId> {
        let request = BulkSyncRequest::from_pending(ops, Some(self.config.device_id.clone()));
        let response = match self.transport.send_bulk(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(count = ops.len(), error = %e, "bulk sync failed");
                return Vec::new();
            }
        };

        let acknowledged: HashSet<&str> = response.acknowledged().collect();
        for result in response.results.iter().filter(|r| !r.success) {
            warn!(
                client_ref = result.client_ref.as_deref().unwrap_or("-"),
                operation = %result.operation,
                message = %result.message,
                "server rejected operation"
            );
        }
        ops.iter()
            .filter(|op| acknowledged.contains(op.id.to_string().as_str()))
            .map(|op| op.id)
            .collect()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
