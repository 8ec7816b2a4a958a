// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::TestContext;
use haul_core::{RouteUpdatePayload, SalePayload};

fn sale() -> Payload {
    Payload::Sale(SalePayload {
        customer_id: "c1".to_string(),
        worker_username: "ana".to_string(),
        bags_delivered: 3,
        unit_price: 15.0,
        route_id: None,
    })
}

#[test]
fn queue_payload_appends_and_counts() {
    let ctx = TestContext::new();

    let (first, pending) = queue_payload(&ctx.device, &sale()).unwrap();
    assert_eq!(pending, 1);
    let (second, pending) = queue_payload(&ctx.device, &sale()).unwrap();
    assert_eq!(pending, 2);

    assert!(second.id > first.id);
    assert_eq!(first.operation, OperationKind::CreateSale);
}

#[test]
fn empty_route_update_is_refused() {
    let ctx = TestContext::new();
    let update = Payload::RouteUpdate(RouteUpdatePayload {
        route_id: "r1".to_string(),
        ..Default::default()
    });

    let err = queue_payload(&ctx.device, &update).unwrap_err();

    assert!(matches!(err, Error::NothingToUpdate));
    assert!(ctx.queue().is_empty().unwrap());
}

#[test]
fn queue_raw_validates_kind() {
    let ctx = TestContext::new();
    let err = queue_raw(&ctx.device, "delete_route", "{}").unwrap_err();
    assert!(matches!(err, Error::Core(haul_core::Error::UnknownOperation(_))));
}

#[test]
fn queue_raw_validates_json() {
    let ctx = TestContext::new();
    let err = queue_raw(&ctx.device, "create_sale", "{not json").unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn queue_raw_validates_payload_shape() {
    let ctx = TestContext::new();
    let err = queue_raw(&ctx.device, "create_sale", r#"["not", "an", "object"]"#).unwrap_err();
    assert!(matches!(err, Error::Core(haul_core::Error::InvalidPayload { .. })));
    assert!(ctx.queue().is_empty().unwrap());
}

#[test]
fn queue_raw_accepts_valid_operation() {
    let ctx = TestContext::new();
    let (op, pending) = queue_raw(
        &ctx.device,
        "update_route",
        r#"{"route_id": "r1", "assigned_worker_id": "u-2"}"#,
    )
    .unwrap();

    assert_eq!(op.operation, OperationKind::UpdateRoute);
    assert_eq!(op.data["assigned_worker_id"], "u-2");
    assert_eq!(pending, 1);
}
