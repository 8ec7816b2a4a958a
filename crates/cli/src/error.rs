// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{QueueError, SyncError};

/// All possible errors that can occur in the haulrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'haul init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid server url '{0}'\n  hint: use http://host:port")]
    InvalidServerUrl(String),

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("nothing to update\n  hint: pass at least one of --name, --description, --assign, --status")]
    NothingToUpdate,

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] haul_core::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for haulrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
