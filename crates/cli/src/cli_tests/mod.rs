// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use haul_core::Payload;
use yare::parameterized;

// Helper to parse CLI args
fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn init_defaults_to_per_item() {
    let cli = parse(&["haul", "init", "--server-url", "http://d:1", "--device-id", "t7"]).unwrap();
    match cli.command {
        Command::Init { server_url, device_id, mode, api_key } => {
            assert_eq!(server_url, "http://d:1");
            assert_eq!(device_id, "t7");
            assert_eq!(mode, ModeArg::PerItem);
            assert_eq!(api_key, None);
        }
        _ => panic!("Expected Init command"),
    }
}

#[parameterized(
    snake = { "per_item", SyncMode::PerItem },
    kebab = { "per-item", SyncMode::PerItem },
    bulk = { "bulk", SyncMode::Bulk },
)]
fn init_mode_values(value: &str, expected: SyncMode) {
    let cli = parse(&[
        "haul", "init", "--server-url", "http://d", "--device-id", "t7", "--mode", value,
    ])
    .unwrap();
    match cli.command {
        Command::Init { mode, .. } => assert_eq!(SyncMode::from(mode), expected),
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn init_rejects_blank_device_id() {
    assert!(parse(&["haul", "init", "--server-url", "http://d", "--device-id", " "]).is_err());
}

#[test]
fn delivery_builds_payload_with_defaults() {
    let cli = parse(&[
        "haul", "delivery", "--customer", "c1", "--worker", "ana", "--route", "r1", "--bags",
        "10", "--total", "150",
    ])
    .unwrap();
    let Command::Delivery(args) = cli.command else {
        panic!("Expected Delivery command");
    };
    let Payload::Delivery(p) = args.into_payload() else {
        panic!("Expected delivery payload");
    };
    assert_eq!(p.customer_id, "c1");
    assert_eq!(p.worker_username, "ana");
    assert_eq!(p.route_id, "r1");
    assert_eq!(p.bags_delivered, 10);
    assert_eq!(p.merma_bags, 0);
    assert_eq!(p.total_amount, 150.0);
    assert_eq!(p.refrigerator_status.status, "good");
    assert!(!p.cleaning_data.performed);
}

#[test]
fn delivery_fridge_status_uses_snake_case() {
    let cli = parse(&[
        "haul", "delivery", "--customer", "c1", "--worker", "ana", "--route", "r1", "--bags",
        "1", "--total", "15", "--fridge", "needs_cleaning", "--cleaned", "--cleaning-notes",
        "wiped",
    ])
    .unwrap();
    let Command::Delivery(args) = cli.command else {
        panic!("Expected Delivery command");
    };
    assert_eq!(args.fridge, FridgeStatus::NeedsCleaning);
    let Payload::Delivery(p) = args.into_payload() else {
        panic!("Expected delivery payload");
    };
    assert_eq!(p.refrigerator_status.status, "needs_cleaning");
    assert!(p.cleaning_data.performed);
    assert_eq!(p.cleaning_data.notes, "wiped");
}

#[test]
fn delivery_rejects_negative_bags() {
    assert!(parse(&[
        "haul", "delivery", "--customer", "c1", "--worker", "ana", "--route", "r1", "--bags",
        "-1", "--total", "0",
    ])
    .is_err());
}

#[test]
fn sale_defaults_unit_price() {
    let cli =
        parse(&["haul", "sale", "--customer", "c1", "--worker", "ana", "--bags", "4"]).unwrap();
    let Command::Sale(args) = cli.command else {
        panic!("Expected Sale command");
    };
    let Payload::Sale(p) = args.into_payload() else {
        panic!("Expected sale payload");
    };
    assert_eq!(p.unit_price, 15.0);
    assert_eq!(p.total(), 60.0);
    assert_eq!(p.route_id, None);
}

#[test]
fn route_takes_id_and_optional_fields() {
    let cli =
        parse(&["haul", "route", "r9", "--assign", "u-42", "--status", "completed"]).unwrap();
    let Command::Route(args) = cli.command else {
        panic!("Expected Route command");
    };
    let Payload::RouteUpdate(p) = args.into_payload() else {
        panic!("Expected route payload");
    };
    assert_eq!(p.route_id, "r9");
    assert_eq!(p.assigned_worker_id.as_deref(), Some("u-42"));
    assert_eq!(p.status.as_deref(), Some("completed"));
    assert_eq!(p.name, None);
}

#[test]
fn sync_flags() {
    let cli = parse(&["haul", "sync", "--manual", "-o", "json"]).unwrap();
    match cli.command {
        Command::Sync { manual, output } => {
            assert!(manual);
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("Expected Sync command"),
    }
}

#[test]
fn directory_flag_is_global() {
    let cli = parse(&["haul", "status", "-C", "/tmp/device"]).unwrap();
    assert_eq!(cli.directory, Some(PathBuf::from("/tmp/device")));
}

#[test]
fn enqueue_takes_kind_and_json() {
    let cli = parse(&["haul", "enqueue", "create_sale", "{}"]).unwrap();
    match cli.command {
        Command::Enqueue { kind, data } => {
            assert_eq!(kind, "create_sale");
            assert_eq!(data, "{}");
        }
        _ => panic!("Expected Enqueue command"),
    }
}
