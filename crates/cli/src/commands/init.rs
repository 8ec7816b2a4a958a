// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::{init_data_dir, Config, DATA_DIR_NAME};
use crate::env;
use crate::error::Result;
use crate::sync::SyncMode;

pub fn run(
    root: &Path,
    server_url: String,
    device_id: String,
    mode: SyncMode,
    api_key: Option<String>,
) -> Result<()> {
    let data_dir = env::data_dir().unwrap_or_else(|| root.join(DATA_DIR_NAME));
    let config = init(&data_dir, server_url, device_id, mode, api_key)?;

    println!("Initialized device {} at {}", config.device_id, data_dir.display());
    println!("Server: {}", config.server_url);
    println!("Mode: {}", config.mode.as_str());
    Ok(())
}

pub(crate) fn init(
    data_dir: &Path,
    server_url: String,
    device_id: String,
    mode: SyncMode,
    api_key: Option<String>,
) -> Result<Config> {
    let mut config = Config::new(server_url.trim_end_matches('/'), device_id.trim())?;
    config.mode = mode;
    config.api_key = api_key.filter(|k| !k.is_empty());
    init_data_dir(data_dir, &config)?;
    Ok(config)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
