// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;

#[test]
fn not_initialized_points_at_init() {
    let err = Error::NotInitialized;
    assert!(err.to_string().contains("not initialized"));
    assert!(err.to_string().contains("haul init"));
}

#[test]
fn already_initialized_names_the_path() {
    let err = Error::AlreadyInitialized("/path/to/.haul".to_string());
    assert!(err.to_string().contains("already initialized"));
    assert!(err.to_string().contains("/path/to/.haul"));
}

#[test]
fn invalid_server_url_has_hint() {
    let msg = Error::InvalidServerUrl("depot".to_string()).to_string();
    assert!(msg.contains("'depot'"));
    assert!(msg.contains("hint: use http://host:port"));
}

#[test]
fn nothing_to_update_lists_flags() {
    let msg = Error::NothingToUpdate.to_string();
    assert!(msg.contains("--name"));
    assert!(msg.contains("--status"));
}

#[test]
fn core_errors_pass_through_unchanged() {
    let core = haul_core::Error::UnknownOperation("delete_customer".to_string());
    let expected = core.to_string();

    let err: Error = core.into();
    assert_eq!(err.to_string(), expected);
}

#[test]
fn queue_rejections_pass_through_unchanged() {
    let core = haul_core::Error::UnknownOperation("x".to_string());
    let expected = core.to_string();

    let err: Error = QueueError::from(core).into();
    assert_eq!(err.to_string(), expected);
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("gone"));
}
