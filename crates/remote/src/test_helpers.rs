// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for server tests.

#![allow(clippy::unwrap_used, clippy::panic)]

use rusqlite::types::Value as SqlValue;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;

use haul_core::{RetryConfig, Store};

use crate::config::ServerConfig;

pub const WORKER: &str = "ana";
pub const ADMIN: &str = "boss";
pub const CUSTOMER: &str = "cust-1";
pub const ROUTE: &str = "route-1";

/// A store in a temp directory, seeded with one worker, one admin, one
/// customer, and one route.
pub struct SeededStore {
    pub store: Store,
    pub config: ServerConfig,
    _dir: TempDir,
}

impl SeededStore {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::for_database(dir.path().join("haul.db"));
        config.retry = RetryConfig::new(2, Duration::from_millis(1));
        let store = config.open_store();
        seed(&store);
        SeededStore { store, config, _dir: dir }
    }

    pub fn count(&self, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) AS n FROM {table}");
        let rows = self.store.execute(&sql, &[], true).unwrap().into_rows();
        match rows[0]["n"] {
            SqlValue::Integer(n) => n,
            ref other => panic!("unexpected count {other:?}"),
        }
    }

    pub fn text(&self, sql: &str) -> Option<String> {
        let rows = self.store.execute(sql, &[], true).unwrap().into_rows();
        rows.into_iter().next().and_then(|row| match row.into_values().next() {
            Some(SqlValue::Text(s)) => Some(s),
            _ => None,
        })
    }
}

pub fn seed(store: &Store) {
    for sql in [
        "INSERT INTO users (id, username, role, name) VALUES ('u-worker', 'ana', 'worker', 'Ana')",
        "INSERT INTO users (id, username, role, name) VALUES ('u-admin', 'boss', 'admin', 'Boss')",
        "INSERT INTO customers (id, name) VALUES ('cust-1', 'Corner Store')",
        "INSERT INTO routes (id, name) VALUES ('route-1', 'North')",
    ] {
        store.execute(sql, &[], false).unwrap();
    }
}

pub fn delivery(worker: &str) -> Value {
    json!({
        "customer_id": CUSTOMER,
        "worker_username": worker,
        "bags_delivered": 10,
        "merma_bags": 1,
        "total_amount": 150.0,
        "refrigerator_status": {"status": "good", "notes": "clean"},
        "cleaning_data": {"performed": true, "notes": "wiped"},
        "evidence_notes": "photo",
        "route_id": ROUTE
    })
}

pub fn sale(worker: &str) -> Value {
    json!({"customer_id": CUSTOMER, "worker_username": worker, "bags_delivered": 4})
}

pub fn route_update(name: &str) -> Value {
    json!({"route_id": ROUTE, "name": name})
}
