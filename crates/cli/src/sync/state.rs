// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded automatic retries with escalation to the operator.
//!
//! Automatic flushes that leave work behind count against a small budget.
//! Once it is spent, automatic flushes are refused until a manual flush or a
//! new enqueue resets the counter.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::persist::{read_json_or_quarantine, write_json_atomic};

/// Automatic flushes allowed to leave items behind before escalating.
pub const MAX_AUTO_RETRIES: u32 = 2;

/// Persisted retry counter and escalation flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default)]
    pub auto_retries_done: u32,
    #[serde(default)]
    pub manual_required: bool,
}

/// Whether a flush may touch the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Blocked,
}

impl SyncState {
    /// Decides whether a flush may run. Manual flushes always proceed.
    pub fn check(&self, is_manual: bool, max_auto_retries: u32) -> Decision {
        if !is_manual && self.auto_retries_done >= max_auto_retries {
            Decision::Blocked
        } else {
            Decision::Proceed
        }
    }

    /// State after a flush that left `remaining` items queued.
    ///
    /// A manual flush resets the state even when items remain.
    pub fn after_flush(&self, is_manual: bool, remaining: usize, max_auto_retries: u32) -> Self {
        if remaining == 0 || is_manual {
            return SyncState::default();
        }
        let auto_retries_done = self.auto_retries_done.saturating_add(1);
        SyncState {
            auto_retries_done,
            manual_required: self.manual_required || auto_retries_done >= max_auto_retries,
        }
    }
}

/// File-backed [`SyncState`].
#[derive(Debug, Clone)]
pub struct SyncStateStore {
    path: PathBuf,
}

impl SyncStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SyncStateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state; a missing or unreadable file reads as the default.
    pub fn load(&self) -> io::Result<SyncState> {
        read_json_or_quarantine(&self.path)
    }

    pub fn save(&self, state: &SyncState) -> io::Result<()> {
        write_json_atomic(&self.path, state)
    }

    pub fn reset(&self) -> io::Result<()> {
        self.save(&SyncState::default())
    }

    /// Reads the persisted escalation flag.
    pub fn is_manual_required(&self) -> io::Result<bool> {
        Ok(self.load()?.manual_required)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
