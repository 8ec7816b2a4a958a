// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so connections are refused.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn haul() -> Command {
    let mut cmd = cargo_bin_cmd!("haul");
    for var in ["HAUL_DIR", "HAUL_SERVER_URL", "HAUL_API_KEY", "HAUL_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper to create an initialized device directory
pub fn init_temp(server_url: &str) -> TempDir {
    init_temp_with(server_url, &[])
}

/// Helper to create an initialized device directory with extra init flags
pub fn init_temp_with(server_url: &str, extra: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    haul()
        .args(["init", "--server-url", server_url, "--device-id", "truck-7"])
        .args(extra)
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Queues a sale and returns the operation id from the output.
pub fn queue_sale(temp: &TempDir, worker: &str, bags: u32) -> String {
    let output = haul()
        .args(["sale", "--customer", "cust-1", "--worker", worker, "--bags", &bags.to_string()])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .nth(2)
        .unwrap()
        .to_string()
}

/// Runs `haul sync -o json` and returns the parsed outcome.
pub fn sync_json(temp: &TempDir, manual: bool) -> serde_json::Value {
    let mut cmd = haul();
    cmd.args(["sync", "-o", "json"]).current_dir(temp.path());
    if manual {
        cmd.arg("--manual");
    }
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

pub fn pending_count(temp: &TempDir) -> usize {
    let output = haul().args(["status", "-o", "json"]).current_dir(temp.path()).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    status["pending"].as_u64().unwrap() as usize
}
