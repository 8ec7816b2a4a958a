// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for haul-core operations.

use thiserror::Error;

use crate::store::StoreError;

/// All possible errors that can occur in haul-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown operation: {0}\n  hint: valid operations are: create_delivery, create_sale, update_route")]
    UnknownOperation(String),

    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: String, reason: String },

    #[error("invalid operation id: {0}")]
    InvalidOpId(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A specialized Result type for haul-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
