// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands that queue operations: delivery, sale, route, enqueue.
//!
//! None of them touch the network; `haul sync` sends what they queue.

use haul_core::{OperationKind, Payload, PendingOperation};
use serde_json::Value;

use super::Device;
use crate::error::{Error, Result};

/// Queues a typed payload.
pub fn run(device: &Device, payload: Payload) -> Result<()> {
    let (op, pending) = queue_payload(device, &payload)?;
    print_queued(&op, pending);
    Ok(())
}

/// Queues an operation given as a kind name and a JSON document.
pub fn run_raw(device: &Device, kind: &str, data: &str) -> Result<()> {
    let (op, pending) = queue_raw(device, kind, data)?;
    print_queued(&op, pending);
    Ok(())
}

pub(crate) fn queue_payload(
    device: &Device,
    payload: &Payload,
) -> Result<(PendingOperation, usize)> {
    if let Payload::RouteUpdate(update) = payload {
        if update.changes().is_empty() {
            return Err(Error::NothingToUpdate);
        }
    }
    let queue = device.queue()?;
    let op = queue.enqueue(payload)?;
    Ok((op, queue.len()?))
}

pub(crate) fn queue_raw(
    device: &Device,
    kind: &str,
    data: &str,
) -> Result<(PendingOperation, usize)> {
    let kind: OperationKind = kind.parse()?;
    let data: Value = serde_json::from_str(data)?;
    let payload = Payload::parse(kind, &data)?;
    queue_payload(device, &payload)
}

fn print_queued(op: &PendingOperation, pending: usize) {
    println!("Queued {} {} ({} pending)", op.operation, op.id, pending);
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
