// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP wire messages shared by the device client and the server.
//!
//! - Devices flush either one operation per request, or the whole queue as
//!   a single [`BulkSyncRequest`]
//! - The server answers a bulk request with one [`BulkResult`] per item, in
//!   submission order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operation::PendingOperation;

/// Header carrying the shared device key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying a per-item operation's op id, so a resend is applied once.
pub const OPERATION_ID_HEADER: &str = "x-operation-id";

/// Message for an item whose handler succeeded.
pub const MSG_OK: &str = "OK";
/// Message for an item whose handler ran but changed nothing.
pub const MSG_NO_EFFECT: &str = "operation returned no effect";

/// One item of a bulk batch.
///
/// `operation` stays a string on the wire so an unknown kind can be reported
/// per item instead of rejecting the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOperation {
    pub operation: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
}

impl From<&PendingOperation> for BulkOperation {
    fn from(op: &PendingOperation) -> Self {
        BulkOperation {
            operation: op.operation.to_string(),
            data: op.data.clone(),
            client_ref: Some(op.id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkSyncRequest {
    pub operations: Vec<BulkOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_timestamp: Option<DateTime<Utc>>,
}

impl BulkSyncRequest {
    /// Builds a request carrying every pending operation, keyed by op id.
    pub fn from_pending(ops: &[PendingOperation], device_id: Option<String>) -> Self {
        BulkSyncRequest {
            operations: ops.iter().map(BulkOperation::from).collect(),
            device_id,
            sync_timestamp: Some(Utc::now()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Outcome of one bulk item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
    pub operation: String,
    pub success: bool,
    pub message: String,
}

impl BulkResult {
    fn new(item: &BulkOperation, success: bool, message: String) -> Self {
        BulkResult {
            client_ref: item.client_ref.clone(),
            operation: item.operation.clone(),
            success,
            message,
        }
    }

    pub fn succeeded(item: &BulkOperation) -> Self {
        Self::new(item, true, MSG_OK.to_string())
    }

    pub fn no_effect(item: &BulkOperation) -> Self {
        Self::new(item, false, MSG_NO_EFFECT.to_string())
    }

    pub fn raised(item: &BulkOperation, error: impl std::fmt::Display) -> Self {
        Self::new(item, false, format!("operation raised: {error}"))
    }

    pub fn unknown(item: &BulkOperation) -> Self {
        Self::new(item, false, format!("unknown operation: {}", item.operation))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkSyncResponse {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BulkResult>,
}

impl BulkSyncResponse {
    /// Aggregates counts from per-item results.
    pub fn from_results(results: Vec<BulkResult>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        BulkSyncResponse {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }

    /// Client refs the server reported as applied.
    pub fn acknowledged(&self) -> impl Iterator<Item = &str> {
        self.results.iter().filter(|r| r.success).filter_map(|r| r.client_ref.as_deref())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Body of per-item endpoint responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        ApiResponse { success: true, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse { success: false, message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ping: Option<DateTime<Utc>>,
}

impl HealthReport {
    pub fn new(database: bool, last_ping: Option<DateTime<Utc>>) -> Self {
        let status = if database { HealthStatus::Ok } else { HealthStatus::Degraded };
        HealthReport { status, database, last_ping }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
