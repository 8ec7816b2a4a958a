// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> ServerArgs {
    let mut argv = vec!["haul-remote"];
    argv.extend_from_slice(args);
    ServerArgs::try_parse_from(argv).unwrap()
}

#[test]
fn defaults() {
    let config = ServerConfig::try_from(parse(&[])).unwrap();
    assert_eq!(config.bind.port(), 7890);
    assert_eq!(config.max_bulk_items, 500);
    assert_eq!(config.retry, RetryConfig::new(5, Duration::from_secs(1)));
    assert_eq!(config.busy_timeout, Duration::from_millis(5000));
    assert_eq!(config.api_key, None);
}

#[test]
fn flags_override_defaults() {
    let config = ServerConfig::try_from(parse(&[
        "--bind",
        "127.0.0.1:9000",
        "--database",
        "/tmp/x.db",
        "--max-bulk-items",
        "10",
        "--connect-retries",
        "2",
        "--retry-base-delay-ms",
        "50",
        "--api-key",
        "secret",
    ]))
    .unwrap();

    assert_eq!(config.bind, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    assert_eq!(config.database, PathBuf::from("/tmp/x.db"));
    assert_eq!(config.max_bulk_items, 10);
    assert_eq!(config.retry, RetryConfig::new(2, Duration::from_millis(50)));
    assert_eq!(config.api_key.as_deref(), Some("secret"));
}

#[parameterized(
    zero_bulk = { &["--max-bulk-items", "0"], ConfigError::ZeroBulkLimit },
    blank_key = { &["--api-key", "  "], ConfigError::EmptyApiKey },
)]
fn rejects_invalid(args: &[&str], expected: ConfigError) {
    assert_eq!(ServerConfig::try_from(parse(args)).unwrap_err(), expected);
}

#[test]
fn rejects_malformed_bind() {
    assert!(ServerArgs::try_parse_from(["haul-remote", "--bind", "nowhere"]).is_err());
}

#[test]
fn for_database_uses_ephemeral_port() {
    let config = ServerConfig::for_database("a.db");
    assert_eq!(config.bind.port(), 0);
    assert_eq!(config.max_bulk_items, 500);
}
