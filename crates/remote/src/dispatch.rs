// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk dispatcher: applies a heterogeneous batch item by item.
//!
//! Items are isolated. A failing item is reported and the batch moves on;
//! it never rolls back or skips another item.

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use haul_core::{BulkResult, BulkSyncRequest, BulkSyncResponse, OperationKind, Store};

use crate::handlers::{handler_for, HandlerResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("batch of {size} operations exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
}

/// Runs every item of `request` through `run`, in order.
///
/// `run` receives each item's `client_ref` as its operation key. Unknown
/// operation names fail without reaching `run`. An oversized batch is
/// rejected before any item executes.
pub fn dispatch<F>(
    request: &BulkSyncRequest,
    max_batch_size: usize,
    mut run: F,
) -> Result<BulkSyncResponse, DispatchError>
where
    F: FnMut(OperationKind, &Value, Option<&str>) -> HandlerResult,
{
    let size = request.operations.len();
    if size > max_batch_size {
        warn!(size, max = max_batch_size, "bulk batch rejected");
        return Err(DispatchError::BatchTooLarge { size, max: max_batch_size });
    }

    let results = request
        .operations
        .iter()
        .map(|item| {
            let Ok(kind) = item.operation.parse::<OperationKind>() else {
                warn!(operation = %item.operation, "unknown operation in batch");
                return BulkResult::unknown(item);
            };
            match run(kind, &item.data, item.client_ref.as_deref()) {
                Ok(true) => BulkResult::succeeded(item),
                Ok(false) => BulkResult::no_effect(item),
                Err(e) => {
                    warn!(
                        operation = %kind,
                        client_ref = ?item.client_ref,
                        error = %e,
                        "operation failed"
                    );
                    BulkResult::raised(item, e)
                }
            }
        })
        .collect();

    let response = BulkSyncResponse::from_results(results);
    info!(
        device_id = request.device_id.as_deref().unwrap_or("-"),
        total = response.total,
        successful = response.successful,
        failed = response.failed,
        "bulk sync applied"
    );
    Ok(response)
}

/// Dispatches against the store's typed handlers.
pub fn dispatch_to_store(
    store: &Store,
    request: &BulkSyncRequest,
    max_batch_size: usize,
) -> Result<BulkSyncResponse, DispatchError> {
    dispatch(request, max_batch_size, |kind, data, key| handler_for(kind)(store, data, key))
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
