// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device configuration management.
//!
//! Configuration is stored in `.haul/config.toml` and includes:
//! - `server_url`: base URL of the sync server (e.g., `http://depot:7890`)
//! - `device_id`: stable name of this device, used for operation ids
//! - `timeout_secs`, `max_auto_retries`, `mode`, `max_batch_size`: sync tuning
//! - `api_key`: optional shared key sent with every request

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{SyncConfig, SyncMode, DEFAULT_BATCH_SIZE, MAX_AUTO_RETRIES};

pub const DATA_DIR_NAME: &str = ".haul";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Device configuration stored in `.haul/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the sync server.
    pub server_url: String,
    /// Stable device name.
    pub device_id: String,
    /// Bound on every outbound call, in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Automatic syncs allowed to leave work behind before a manual sync is
    /// required (default: 2).
    #[serde(default = "default_max_auto_retries")]
    pub max_auto_retries: u32,
    /// `per_item` or `bulk` (default: `per_item`).
    #[serde(default)]
    pub mode: SyncMode,
    /// Operations per bulk request (default: 500). Keep it at or below the
    /// server's `--max-bulk-items`.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_auto_retries() -> u32 {
    MAX_AUTO_RETRIES
}

fn default_max_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Config {
    /// Creates a config with default sync tuning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidServerUrl`] or [`Error::FieldEmpty`] when the
    /// inputs are unusable.
    pub fn new(server_url: impl Into<String>, device_id: impl Into<String>) -> Result<Self> {
        let config = Config {
            server_url: server_url.into(),
            device_id: device_id.into(),
            timeout_secs: default_timeout_secs(),
            max_auto_retries: default_max_auto_retries(),
            mode: SyncMode::default(),
            max_batch_size: default_max_batch_size(),
            api_key: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_server_url(&self.server_url)?;
        if self.device_id.trim().is_empty() {
            return Err(Error::FieldEmpty { field: "device_id" });
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.max_batch_size == 0 {
            return Err(Error::Config("max_batch_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Loads configuration from the given `.haul/` directory.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.haul/` directory.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Applies `HAUL_SERVER_URL` and `HAUL_API_KEY` when set.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(url) = env::server_url() {
            validate_server_url(&url)?;
            self.server_url = url;
        }
        if let Some(key) = env::api_key() {
            self.api_key = Some(key);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            server_url: self.server_url.clone(),
            device_id: self.device_id.clone(),
            timeout: self.timeout(),
            max_auto_retries: self.max_auto_retries,
            mode: self.mode,
            max_batch_size: self.max_batch_size,
            api_key: self.api_key.clone(),
        }
    }
}

/// Accepts `http://` and `https://` URLs with a host.
pub fn validate_server_url(url: &str) -> Result<()> {
    let host = url.strip_prefix("http://").or_else(|| url.strip_prefix("https://"));
    match host {
        Some(rest) if !rest.trim_matches('/').is_empty() => Ok(()),
        _ => Err(Error::InvalidServerUrl(url.to_string())),
    }
}

/// Finds the `.haul` directory by walking up from `start`.
pub fn find_data_dir(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR_NAME);
        if data_dir.join(CONFIG_FILE_NAME).is_file() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Resolves the data directory: `HAUL_DIR` if set, else a walk up from `start`.
pub fn resolve_data_dir(start: &Path) -> Result<PathBuf> {
    match env::data_dir() {
        Some(dir) if dir.join(CONFIG_FILE_NAME).is_file() => Ok(dir),
        Some(_) => Err(Error::NotInitialized),
        None => find_data_dir(start),
    }
}

/// Creates `data_dir` and writes `config` into it.
pub fn init_data_dir(data_dir: &Path, config: &Config) -> Result<()> {
    if data_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(data_dir.display().to_string()));
    }
    fs::create_dir_all(data_dir)?;
    config.save(data_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
