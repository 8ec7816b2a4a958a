// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    delivery = { OperationKind::CreateDelivery, "deliveries" },
    sale = { OperationKind::CreateSale, "sales" },
)]
fn handler_for_routes_by_kind(kind: OperationKind, table: &str) {
    let db = SeededStore::new();
    let data = match kind {
        OperationKind::CreateDelivery => crate::test_helpers::delivery(WORKER),
        _ => crate::test_helpers::sale(WORKER),
    };
    assert!(handler_for(kind)(&db.store, &data, None).unwrap());
    assert_eq!(db.count(table), 1);
}

#[test]
fn delivery_records_delivery_and_sale() {
    let db = SeededStore::new();
    assert!(create_delivery(&db.store, &delivery(WORKER), None).unwrap());

    assert_eq!(db.count("deliveries"), 1);
    assert_eq!(db.count("sales"), 1);
    assert_eq!(
        db.text("SELECT notes FROM sales").as_deref(),
        Some("fridge:clean|cleaning:wiped|notes:photo")
    );
    assert_eq!(db.text("SELECT worker_id FROM deliveries").as_deref(), Some("u-worker"));
}

#[test]
fn delivery_requires_worker_role() {
    let db = SeededStore::new();
    assert!(!create_delivery(&db.store, &delivery(ADMIN), None).unwrap());
    assert!(!create_delivery(&db.store, &delivery("nobody"), None).unwrap());
    assert_eq!(db.count("deliveries"), 0);
}

#[test]
fn delivery_is_all_or_nothing() {
    let db = SeededStore::new();
    let mut data = delivery(WORKER);
    // The sale row references an unknown route, so the whole delivery rolls back
    data["route_id"] = json!("no-such-route");

    let err = create_delivery(&db.store, &data, None).unwrap_err();
    assert!(matches!(err, HandlerError::Store(StoreError::Statement(_))));
    assert!(!err.is_unavailable());
    assert_eq!(db.count("deliveries"), 0);
    assert_eq!(db.count("sales"), 0);
}

#[test]
fn delivery_rejects_unknown_fridge_status() {
    let db = SeededStore::new();
    let mut data = delivery(WORKER);
    data["refrigerator_status"]["status"] = json!("melted");
    assert!(create_delivery(&db.store, &data, None).is_err());
}

#[test]
fn sale_uses_unit_price() {
    let db = SeededStore::new();
    let mut data = sale(ADMIN);
    data["unit_price"] = json!(12.5);
    assert!(create_sale(&db.store, &data, None).unwrap());

    let rows = db
        .store
        .execute("SELECT total_amount, route_id FROM sales", &[], true)
        .unwrap()
        .into_rows();
    assert_eq!(rows[0]["total_amount"], SqlValue::Real(50.0));
    assert_eq!(rows[0]["route_id"], SqlValue::Null);
}

#[test]
fn sale_for_unknown_user_has_no_effect() {
    let db = SeededStore::new();
    assert!(!create_sale(&db.store, &sale("ghost"), None).unwrap());
    assert_eq!(db.count("sales"), 0);
}

#[parameterized(
    delivery = { OperationKind::CreateDelivery, "deliveries" },
    sale = { OperationKind::CreateSale, "sales" },
)]
fn create_resent_under_same_key_is_applied_once(kind: OperationKind, table: &str) {
    let db = SeededStore::new();
    let data = match kind {
        OperationKind::CreateDelivery => crate::test_helpers::delivery(WORKER),
        _ => crate::test_helpers::sale(WORKER),
    };
    let handler = handler_for(kind);

    assert!(handler(&db.store, &data, Some("op-1")).unwrap());
    assert!(handler(&db.store, &data, Some("op-1")).unwrap());
    assert_eq!(db.count(table), 1);
    assert_eq!(
        db.text("SELECT operation FROM applied_operations WHERE operation_key = 'op-1'"),
        Some(kind.as_str().to_string())
    );

    assert!(handler(&db.store, &data, Some("op-2")).unwrap());
    assert_eq!(db.count(table), 2);
}

#[test]
fn create_without_key_is_applied_every_time() {
    let db = SeededStore::new();
    assert!(create_sale(&db.store, &sale(WORKER), None).unwrap());
    assert!(create_sale(&db.store, &sale(WORKER), None).unwrap());
    assert_eq!(db.count("sales"), 2);
    assert_eq!(db.count("applied_operations"), 0);
}

#[test]
fn failed_create_leaves_key_unrecorded() {
    let db = SeededStore::new();
    let mut data = delivery(WORKER);
    data["route_id"] = json!("no-such-route");
    assert!(create_delivery(&db.store, &data, Some("op-1")).is_err());
    assert!(!create_sale(&db.store, &sale("ghost"), Some("op-2")).unwrap());
    assert_eq!(db.count("applied_operations"), 0);

    // A corrected resend under the same key still applies
    assert!(create_delivery(&db.store, &delivery(WORKER), Some("op-1")).unwrap());
    assert_eq!(db.count("deliveries"), 1);
    assert_eq!(db.count("applied_operations"), 1);
}

#[test]
fn route_update_ignores_key() {
    let db = SeededStore::new();
    let data = json!({"route_id": ROUTE, "status": "in_progress"});
    assert!(update_route(&db.store, &data, Some("op-1")).unwrap());
    assert!(update_route(&db.store, &data, Some("op-1")).unwrap());
    assert_eq!(db.count("applied_operations"), 0);
}

#[test]
fn route_update_sets_given_fields() {
    let db = SeededStore::new();
    let data = json!({"route_id": ROUTE, "name": "South", "status": "in_progress"});
    assert!(update_route(&db.store, &data, None).unwrap());

    assert_eq!(db.text("SELECT name FROM routes").as_deref(), Some("South"));
    assert_eq!(db.text("SELECT status FROM routes").as_deref(), Some("in_progress"));
    assert_eq!(db.text("SELECT description FROM routes"), None);
}

#[parameterized(
    no_fields = { json!({"route_id": "route-1"}) },
    missing_route = { json!({"route_id": "route-404", "name": "x"}) },
)]
fn route_update_no_effect(data: Value) {
    let db = SeededStore::new();
    assert!(!update_route(&db.store, &data, None).unwrap());
}

#[parameterized(
    delivery = { create_delivery as Handler },
    sale = { create_sale as Handler },
    route = { update_route as Handler },
)]
fn malformed_payload_is_invalid(handler: Handler) {
    let db = SeededStore::new();
    let err = handler(&db.store, &json!({"bogus": true}), None).unwrap_err();
    assert!(matches!(err, HandlerError::InvalidPayload(_)));
}

#[test]
fn unreachable_store_is_unavailable() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = crate::ServerConfig::for_database(dir.path().join("missing").join("x.db"));
    config.retry = haul_core::RetryConfig::new(1, std::time::Duration::from_millis(1));
    let store = config.open_store();

    let err = create_sale(&store, &sale(WORKER), None).unwrap_err();
    assert!(err.is_unavailable());
}
