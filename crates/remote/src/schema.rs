// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQL schema for the authoritative store.
//!
//! Applied on every new connection; all statements are idempotent.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    username TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL CHECK (role IN ('admin', 'worker')),
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    phone TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS routes (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name TEXT NOT NULL,
    description TEXT,
    assigned_worker_id TEXT REFERENCES users(id),
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'in_progress', 'completed')),
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS deliveries (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    worker_id TEXT NOT NULL REFERENCES users(id),
    bags_delivered INTEGER NOT NULL CHECK (bags_delivered >= 0),
    merma_bags INTEGER NOT NULL DEFAULT 0 CHECK (merma_bags >= 0),
    total_amount REAL NOT NULL CHECK (total_amount >= 0),
    refrigerator_status TEXT NOT NULL
        CHECK (refrigerator_status IN ('excellent', 'good', 'needs_cleaning', 'needs_repair', 'damaged')),
    status_notes TEXT,
    cleaning_performed INTEGER NOT NULL DEFAULT 0,
    cleaning_notes TEXT,
    evidence_notes TEXT,
    delivery_date TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS sales (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    customer_id TEXT NOT NULL REFERENCES customers(id),
    worker_id TEXT NOT NULL REFERENCES users(id),
    route_id TEXT REFERENCES routes(id),
    total_amount REAL NOT NULL CHECK (total_amount >= 0),
    bags_delivered INTEGER NOT NULL CHECK (bags_delivered >= 0),
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Keys of applied create operations; a replayed key is not applied again.
CREATE TABLE IF NOT EXISTS applied_operations (
    operation_key TEXT PRIMARY KEY,
    operation TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_deliveries_customer ON deliveries(customer_id);
CREATE INDEX IF NOT EXISTS idx_sales_worker ON sales(worker_id);
"#;
