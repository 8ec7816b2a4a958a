// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-safe JSON files.
//!
//! Writers never modify a file in place: the new contents go to a sibling
//! `.tmp` file which is fsynced and then renamed over the target. Readers that
//! find an unparseable target move it aside and fall back to the default
//! value, so a torn write costs at most the file it tore.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Sibling path used for in-flight writes of `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

/// Writes `value` as JSON, replacing `path` atomically.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    sync_parent_dir(path)
}

/// Reads JSON from `path`.
///
/// A missing or blank file yields `T::default()`. A file that does not parse
/// is renamed to `<name>.corrupt-<unix_ms>` and also yields the default. Only
/// I/O failures are returned as errors.
pub fn read_json_or_quarantine<T: DeserializeOwned + Default>(path: &Path) -> io::Result<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(e) => {
            let aside = quarantine(path)?;
            warn!(
                file = %path.display(),
                moved_to = %aside.display(),
                error = %e,
                "unreadable file moved aside, starting empty"
            );
            Ok(T::default())
        }
    }
}

fn quarantine(path: &Path) -> io::Result<PathBuf> {
    let aside = with_suffix(path, &format!(".corrupt-{}", Utc::now().timestamp_millis()));
    fs::rename(path, &aside)?;
    Ok(aside)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => File::open(parent)?.sync_all(),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
