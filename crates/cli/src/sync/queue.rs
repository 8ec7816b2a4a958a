// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue for operations that have not reached the server yet.
//!
//! The queue is one JSON array in `pending_operations.json`, rewritten as a
//! whole on every mutation (see [`super::persist`]). Each read-modify-write
//! runs under an in-process mutex and an exclusive advisory lock on
//! `queue.lock`, since separate CLI processes on a device share the queue.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use haul_core::{
    node_id_for, ClockSource, HlcClock, OpId, OperationKind, Payload, PendingOperation,
    SystemClock,
};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use super::persist::{read_json_or_quarantine, write_json_atomic};
use super::state::{SyncState, SyncStateStore};

pub const QUEUE_FILE_NAME: &str = "pending_operations.json";
pub const STATE_FILE_NAME: &str = "sync_state.json";
pub const LOCK_FILE_NAME: &str = "queue.lock";

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error on the queue, state or lock file.
    #[error("queue I/O error: {0}")]
    Io(#[from] io::Error),

    /// The operation was rejected before being queued.
    #[error(transparent)]
    Rejected(#[from] haul_core::Error),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Durable, process-shared queue of [`PendingOperation`]s.
pub struct OfflineQueue<C: ClockSource = SystemClock> {
    path: PathBuf,
    lock_path: PathBuf,
    state: SyncStateStore,
    clock: HlcClock<C>,
    guard: Mutex<()>,
}

impl OfflineQueue<SystemClock> {
    /// Opens the queue stored in `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Path, device_id: &str) -> QueueResult<Self> {
        Self::with_clock(data_dir, device_id, SystemClock)
    }
}

impl<C: ClockSource> OfflineQueue<C> {
    /// Opens the queue with an injected wall clock.
    pub fn with_clock(data_dir: &Path, device_id: &str, clock: C) -> QueueResult<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(OfflineQueue {
            path: data_dir.join(QUEUE_FILE_NAME),
            lock_path: data_dir.join(LOCK_FILE_NAME),
            state: SyncStateStore::new(data_dir.join(STATE_FILE_NAME)),
            clock: HlcClock::with_clock(clock, node_id_for(device_id)),
            guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state_store(&self) -> &SyncStateStore {
        &self.state
    }

    /// Queues a validated payload and resets the retry state.
    ///
    /// Never touches the network. The new id is strictly greater than every
    /// id already in the queue, even across restarts.
    pub fn enqueue(&self, payload: &Payload) -> QueueResult<PendingOperation> {
        self.locked(|| {
            let mut ops = self.read()?;
            let id = match ops.iter().map(|op| &op.id).max() {
                Some(newest) => self.clock.receive(newest),
                None => self.clock.now(),
            };
            let op = PendingOperation::new(id, payload, Utc::now())?;
            ops.push(op.clone());
            // State first: a crash between the writes then only costs a reset.
            self.state.reset()?;
            write_json_atomic(&self.path, &ops)?;
            debug!(id = %op.id, operation = %op.operation, pending = ops.len(), "queued");
            Ok(op)
        })
    }

    /// Validates `data` against the schema for the named kind, then queues it.
    pub fn enqueue_raw(&self, kind: &str, data: &Value) -> QueueResult<PendingOperation> {
        let kind: OperationKind = kind.parse()?;
        let payload = Payload::parse(kind, data)?;
        self.enqueue(&payload)
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> QueueResult<Vec<PendingOperation>> {
        self.locked(|| self.read())
    }

    /// Drops exactly the given ids. Returns how many were removed.
    pub fn remove(&self, ids: &[OpId]) -> QueueResult<usize> {
        self.locked(|| {
            let (removed, _) = self.remove_locked(ids)?;
            Ok(removed)
        })
    }

    /// Removes acknowledged ids and records the resulting retry state in one
    /// critical section. Operations queued since the snapshot are kept.
    ///
    /// `next_state` receives the persisted state and the number of operations
    /// still queued.
    pub fn settle(
        &self,
        acked: &[OpId],
        next_state: impl FnOnce(SyncState, usize) -> SyncState,
    ) -> QueueResult<(usize, SyncState)> {
        self.locked(|| {
            let (_, remaining) = self.remove_locked(acked)?;
            let state = next_state(self.state.load()?, remaining);
            self.state.save(&state)?;
            Ok((remaining, state))
        })
    }

    pub fn len(&self) -> QueueResult<usize> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn sync_state(&self) -> QueueResult<SyncState> {
        self.locked(|| Ok(self.state.load()?))
    }

    pub fn is_manual_required(&self) -> QueueResult<bool> {
        Ok(self.sync_state()?.manual_required)
    }

    pub fn reset_sync_state(&self) -> QueueResult<()> {
        self.locked(|| Ok(self.state.reset()?))
    }

    fn read(&self) -> QueueResult<Vec<PendingOperation>> {
        Ok(read_json_or_quarantine(&self.path)?)
    }

    fn remove_locked(&self, ids: &[OpId]) -> QueueResult<(usize, usize)> {
        let mut ops = self.read()?;
        if ids.is_empty() {
            return Ok((0, ops.len()));
        }
        let acked: HashSet<&OpId> = ids.iter().collect();
        let before = ops.len();
        ops.retain(|op| !acked.contains(&op.id));
        let removed = before - ops.len();
        if removed > 0 {
            write_json_atomic(&self.path, &ops)?;
        }
        Ok((removed, ops.len()))
    }

    fn locked<T>(&self, f: impl FnOnce() -> QueueResult<T>) -> QueueResult<T> {
        let _guard = self.guard.lock();
        let lock_file = open_lock_file(&self.lock_path)?;
        fs2::FileExt::lock_exclusive(&lock_file)?;
        // Closing the file releases the advisory lock.
        f()
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).truncate(false).write(true).open(path)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
