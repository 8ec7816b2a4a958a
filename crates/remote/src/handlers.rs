// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed handlers that apply one operation to the store.
//!
//! A handler returns `Ok(true)` when the operation took effect, `Ok(false)`
//! when it was valid but changed nothing (unknown worker, no fields to
//! update, missing route), and `Err` when it could not be applied.
//!
//! Creates accept an optional operation key (the device's op id). The key is
//! recorded in the same transaction as the rows it produced, and a key seen
//! before answers `Ok(true)` without inserting again, so a resent create is
//! applied once. Route updates set absolute values and ignore the key.

use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use haul_core::{
    DeliveryPayload, OperationKind, RouteUpdatePayload, SalePayload, Statement, Store,
    StoreError, StoreResult,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidPayload(#[from] haul_core::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HandlerError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, HandlerError::Store(e) if e.is_unavailable())
    }
}

pub type HandlerResult = Result<bool, HandlerError>;

pub type Handler = fn(&Store, &Value, Option<&str>) -> HandlerResult;

/// Returns the handler for an operation kind.
pub fn handler_for(kind: OperationKind) -> Handler {
    match kind {
        OperationKind::CreateDelivery => create_delivery,
        OperationKind::CreateSale => create_sale,
        OperationKind::UpdateRoute => update_route,
    }
}

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

fn opt_text(s: Option<&str>) -> SqlValue {
    s.map_or(SqlValue::Null, text)
}

/// Looks up a user id by username, optionally requiring the worker role.
fn find_user_id(
    store: &Store,
    username: &str,
    workers_only: bool,
) -> StoreResult<Option<String>> {
    let sql = if workers_only {
        "SELECT id FROM users WHERE username = ?1 AND role = 'worker'"
    } else {
        "SELECT id FROM users WHERE username = ?1"
    };
    let rows = store.execute(sql, &[text(username)], true)?.into_rows();
    Ok(rows.into_iter().next().and_then(|mut row| match row.remove("id") {
        Some(SqlValue::Text(id)) => Some(id),
        _ => None,
    }))
}

/// True when `key` was recorded by an earlier create.
fn already_applied(store: &Store, key: Option<&str>) -> StoreResult<bool> {
    let Some(key) = key else {
        return Ok(false);
    };
    let rows = store
        .execute(
            "SELECT operation_key FROM applied_operations WHERE operation_key = ?1",
            &[text(key)],
            true,
        )?
        .into_rows();
    Ok(!rows.is_empty())
}

/// Records `key` as applied. The primary key fails a concurrent duplicate,
/// which rolls back the rows inserted alongside it.
fn record_applied(key: &str, kind: OperationKind) -> Statement {
    Statement::new(
        "INSERT INTO applied_operations (operation_key, operation) VALUES (?1, ?2)",
        vec![text(key), text(kind.as_str())],
    )
}

/// Records a delivery and its sale atomically.
pub fn create_delivery(store: &Store, data: &Value, key: Option<&str>) -> HandlerResult {
    let delivery = DeliveryPayload::from_value(data)?;
    if already_applied(store, key)? {
        debug!(key = ?key, "delivery already applied");
        return Ok(true);
    }
    let Some(worker_id) = find_user_id(store, &delivery.worker_username, true)? else {
        debug!(worker = %delivery.worker_username, "delivery for unknown worker");
        return Ok(false);
    };

    let insert_delivery = Statement::new(
        "INSERT INTO deliveries
            (customer_id, worker_id, bags_delivered, merma_bags, total_amount,
             refrigerator_status, status_notes, cleaning_performed, cleaning_notes,
             evidence_notes, delivery_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        vec![
            text(&delivery.customer_id),
            text(&worker_id),
            SqlValue::Integer(delivery.bags_delivered),
            SqlValue::Integer(delivery.merma_bags),
            SqlValue::Real(delivery.total_amount),
            text(&delivery.refrigerator_status.status),
            text(&delivery.refrigerator_status.notes),
            SqlValue::Integer(i64::from(delivery.cleaning_data.performed)),
            text(&delivery.cleaning_data.notes),
            text(&delivery.evidence_notes),
            SqlValue::Text(Utc::now().to_rfc3339()),
        ],
    );
    let insert_sale = Statement::new(
        "INSERT INTO sales (customer_id, worker_id, route_id, bags_delivered, total_amount, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
            text(&delivery.customer_id),
            text(&worker_id),
            text(&delivery.route_id),
            SqlValue::Integer(delivery.bags_delivered),
            SqlValue::Real(delivery.total_amount),
            SqlValue::Text(delivery.sale_note()),
        ],
    );

    let mut statements = vec![insert_delivery, insert_sale];
    statements.extend(key.map(|k| record_applied(k, OperationKind::CreateDelivery)));
    store.execute_transaction(&statements)?;
    Ok(true)
}

/// Records a sale priced at `bags_delivered * unit_price`.
pub fn create_sale(store: &Store, data: &Value, key: Option<&str>) -> HandlerResult {
    let sale = SalePayload::from_value(data)?;
    if already_applied(store, key)? {
        debug!(key = ?key, "sale already applied");
        return Ok(true);
    }
    let Some(worker_id) = find_user_id(store, &sale.worker_username, false)? else {
        debug!(worker = %sale.worker_username, "sale for unknown user");
        return Ok(false);
    };

    let insert_sale = Statement::new(
        "INSERT INTO sales (customer_id, worker_id, route_id, total_amount, bags_delivered)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
            text(&sale.customer_id),
            text(&worker_id),
            opt_text(sale.route_id.as_deref()),
            SqlValue::Real(sale.total()),
            SqlValue::Integer(sale.bags_delivered),
        ],
    );

    let mut statements = vec![insert_sale];
    statements.extend(key.map(|k| record_applied(k, OperationKind::CreateSale)));
    let outputs = store.execute_transaction(&statements)?;
    Ok(outputs.first().is_some_and(|out| out.affected() > 0))
}

/// Updates the fields present in the payload. Nothing to set, or no such
/// route, is no effect.
pub fn update_route(store: &Store, data: &Value, _key: Option<&str>) -> HandlerResult {
    let update = RouteUpdatePayload::from_value(data)?;
    let changes = update.changes();
    if changes.is_empty() {
        return Ok(false);
    }

    let assignments: Vec<String> =
        changes.iter().enumerate().map(|(i, (col, _))| format!("{col} = ?{}", i + 1)).collect();
    let sql = format!(
        "UPDATE routes SET {} WHERE id = ?{}",
        assignments.join(", "),
        changes.len() + 1
    );
    let mut params: Vec<SqlValue> = changes.iter().map(|(_, v)| text(v)).collect();
    params.push(text(&update.route_id));

    let updated = store.execute(&sql, &params, false)?.affected();
    Ok(updated > 0)
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
