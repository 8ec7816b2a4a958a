// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the `HAUL_LOG` filter directive if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::HAUL_LOG)
}

/// Returns the value of `HAUL_DIR` if set: a `.haul` directory to use
/// instead of searching upward.
pub fn data_dir() -> Option<PathBuf> {
    non_empty(vars::HAUL_DIR).map(PathBuf::from)
}

/// Returns the value of `HAUL_SERVER_URL` if set.
pub fn server_url() -> Option<String> {
    non_empty(vars::HAUL_SERVER_URL)
}

/// Returns the value of `HAUL_API_KEY` if set.
pub fn api_key() -> Option<String> {
    non_empty(vars::HAUL_API_KEY)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
