// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use haul_core::{
    BulkResult, BulkSyncRequest, BulkSyncResponse, ClockSource, OperationKind, Payload,
    PendingOperation,
};
use parking_lot::Mutex;
use serde_json::json;

use super::queue::OfflineQueue;
use super::transport::{ItemRequest, Transport, TransportError, TransportFuture, TransportResult};

pub const DEVICE: &str = "truck-7";

/// Wall clock frozen at a settable instant.
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn at(ms: u64) -> Self {
        FixedClock(AtomicU64::new(ms))
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl ClockSource for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn open_queue(dir: &Path) -> OfflineQueue {
    OfflineQueue::open(dir, DEVICE).unwrap()
}

pub fn delivery() -> Payload {
    Payload::parse(
        OperationKind::CreateDelivery,
        &json!({
            "customer_id": "cust-1",
            "worker_username": "ana",
            "bags_delivered": 10,
            "merma_bags": 1,
            "total_amount": 150.0,
            "refrigerator_status": {"status": "good", "notes": "door ok"},
            "cleaning_data": {"performed": true, "notes": "wiped"},
            "evidence_notes": "left at back",
            "route_id": "route-1"
        }),
    )
    .unwrap()
}

pub fn sale(bags: i64) -> Payload {
    Payload::parse(
        OperationKind::CreateSale,
        &json!({"customer_id": "cust-1", "worker_username": "ana", "bags_delivered": bags}),
    )
    .unwrap()
}

pub fn route_update(route_id: &str) -> Payload {
    Payload::parse(OperationKind::UpdateRoute, &json!({"route_id": route_id, "status": "done"}))
        .unwrap()
}

/// Builds a bulk response that acknowledges the ops whose index passes `ok`.
pub fn bulk_response(ops: &[PendingOperation], ok: impl Fn(usize) -> bool) -> BulkSyncResponse {
    let request = BulkSyncRequest::from_pending(ops, None);
    let results = request
        .operations
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if ok(i) {
                BulkResult::succeeded(item)
            } else {
                BulkResult::no_effect(item)
            }
        })
        .collect();
    BulkSyncResponse::from_results(results)
}

type Hook = Box<dyn FnOnce() + Send>;

/// Scripted transport that records what it was asked to send.
///
/// Replies are consumed in order; once a script runs dry every call fails as
/// if the server were unreachable.
#[derive(Default)]
pub struct MockTransport {
    item_replies: Mutex<VecDeque<TransportResult<u16>>>,
    bulk_replies: Mutex<VecDeque<TransportResult<BulkSyncResponse>>>,
    sent: Mutex<Vec<ItemRequest>>,
    bulk_sent: Mutex<Vec<BulkSyncRequest>>,
    on_first_call: Mutex<Option<Hook>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16) -> Self {
        self.item_replies.lock().push_back(Ok(status));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.item_replies.lock().push_back(Err(error));
        self
    }

    pub fn reply_bulk(self, response: TransportResult<BulkSyncResponse>) -> Self {
        self.bulk_replies.lock().push_back(response);
        self
    }

    /// Runs `hook` once, when the first request arrives.
    pub fn on_first_call(self, hook: impl FnOnce() + Send + 'static) -> Self {
        *self.on_first_call.lock() = Some(Box::new(hook));
        self
    }

    pub fn sent(&self) -> Vec<ItemRequest> {
        self.sent.lock().clone()
    }

    pub fn bulk_sent(&self) -> Vec<BulkSyncRequest> {
        self.bulk_sent.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().len() + self.bulk_sent.lock().len()
    }

    fn run_hook(&self) {
        let hook = self.on_first_call.lock().take();
        if let Some(hook) = hook {
            hook();
        }
    }
}

fn unreachable() -> TransportError {
    TransportError::Connection("mock server unreachable".to_string())
}

impl Transport for MockTransport {
    fn send(&self, request: ItemRequest) -> TransportFuture<'_, u16> {
        Box::pin(async move {
            self.run_hook();
            self.sent.lock().push(request);
            self.item_replies.lock().pop_front().unwrap_or_else(|| Err(unreachable()))
        })
    }

    fn send_bulk(&self, request: BulkSyncRequest) -> TransportFuture<'_, BulkSyncResponse> {
        Box::pin(async move {
            self.run_hook();
            self.bulk_sent.lock().push(request);
            self.bulk_replies.lock().pop_front().unwrap_or_else(|| Err(unreachable()))
        })
    }
}
