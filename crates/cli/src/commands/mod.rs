// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod init;
pub mod record;
pub mod status;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::{Path, PathBuf};

use crate::config::{resolve_data_dir, Config};
use crate::error::Result;
use crate::sync::OfflineQueue;

/// An initialized device: where its files live and how it syncs.
#[derive(Debug, Clone)]
pub struct Device {
    pub data_dir: PathBuf,
    pub config: Config,
}

impl Device {
    /// Finds the device's `.haul` directory from `root` and loads its config,
    /// with environment overrides applied.
    pub fn open(root: &Path) -> Result<Self> {
        let data_dir = resolve_data_dir(root)?;
        let config = Config::load(&data_dir)?.with_env_overrides()?;
        Ok(Device { data_dir, config })
    }

    pub fn queue(&self) -> Result<OfflineQueue> {
        Ok(OfflineQueue::open(&self.data_dir, &self.config.device_id)?)
    }
}
