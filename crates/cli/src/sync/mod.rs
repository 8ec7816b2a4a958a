// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync of device operations to the server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │    Client    │────►│  Transport   │────►│    Server    │
//! │ (SyncClient) │◄────│   (trait)    │◄────│ (haul-remote)│
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │
//!        ▼
//! ┌──────────────┐     ┌──────────────┐
//! │    Queue     │────►│  SyncState   │
//! │(OfflineQueue)│     │  (retries)   │
//! └──────────────┘     └──────────────┘
//! ```
//!
//! # Features
//!
//! - Durable queue, rewritten atomically on every mutation
//! - Per-item or bulk flush; only acknowledged operations leave the queue
//! - Bounded automatic retries, then escalation to a manual sync
//! - Injectable transport trait for testing

mod client;
mod persist;
mod queue;
mod state;
mod transport;

pub use client::{
    FlushReport, SyncClient, SyncConfig, SyncError, SyncMode, DEFAULT_BATCH_SIZE, DEFAULT_TIMEOUT,
};
pub use queue::{
    OfflineQueue, QueueError, QueueResult, LOCK_FILE_NAME, QUEUE_FILE_NAME, STATE_FILE_NAME,
};
pub use state::{Decision, SyncState, SyncStateStore, MAX_AUTO_RETRIES};
pub use transport::{HttpTransport, ItemRequest, Transport, TransportError, TransportResult};

#[cfg(test)]
mod test_helpers;
