// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hybrid Logical Clock (HLC) used for device-local operation ids.
//!
//! Each queued operation gets an id combining wall time with a logical
//! counter, so ids stay strictly increasing on one device even if the wall
//! clock steps backwards between enqueues.
//!
//! Format: `{wall_ms}-{counter}-{node_id}`
//!
//! Ordering: wall_ms, then counter, then node_id.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// A Hybrid Logical Clock timestamp.
///
/// Serialized as its string form so queue files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Hlc {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for ordering events at the same wall time.
    pub counter: u32,
    /// Node identifier derived from the device id.
    pub node_id: u32,
}

impl Hlc {
    pub fn new(wall_ms: u64, counter: u32, node_id: u32) -> Self {
        Hlc { wall_ms, counter, node_id }
    }

    /// The earliest possible timestamp.
    pub fn min() -> Self {
        Hlc { wall_ms: 0, counter: 0, node_id: 0 }
    }

    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl Ord for Hlc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms
            .cmp(&other.wall_ms)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

impl PartialOrd for Hlc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Hlc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wall_ms, self.counter, self.node_id)
    }
}

impl FromStr for Hlc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('-');
        let (Some(wall), Some(counter), Some(node), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidOpId(format!(
                "expected format 'wall_ms-counter-node_id', got '{s}'"
            )));
        };

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidOpId(format!("invalid wall_ms '{wall}' in '{s}'")))?;
        let counter = counter
            .parse::<u32>()
            .map_err(|_| Error::InvalidOpId(format!("invalid counter '{counter}' in '{s}'")))?;
        let node_id = node
            .parse::<u32>()
            .map_err(|_| Error::InvalidOpId(format!("invalid node_id '{node}' in '{s}'")))?;

        Ok(Hlc::new(wall_ms, counter, node_id))
    }
}

impl From<Hlc> for String {
    fn from(hlc: Hlc) -> Self {
        hlc.to_string()
    }
}

impl TryFrom<String> for Hlc {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Derives a stable node id from a device id (32-bit FNV-1a).
pub fn node_id_for(device_id: &str) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    device_id.bytes().fold(OFFSET, |hash, b| (hash ^ u32::from(b)).wrapping_mul(PRIME))
}

/// Source of wall clock time, injectable for tests.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl<C: ClockSource> ClockSource for &C {
    fn now_ms(&self) -> u64 {
        (*self).now_ms()
    }
}

/// Produces strictly increasing HLC timestamps for one node.
pub struct HlcClock<C: ClockSource = SystemClock> {
    clock: C,
    node_id: u32,
    /// Last issued (wall_ms, counter).
    last: Mutex<(u64, u32)>,
}

impl HlcClock<SystemClock> {
    pub fn new(node_id: u32) -> Self {
        Self::with_clock(SystemClock, node_id)
    }
}

impl<C: ClockSource> HlcClock<C> {
    pub fn with_clock(clock: C, node_id: u32) -> Self {
        HlcClock { clock, node_id, last: Mutex::new((0, 0)) }
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    /// Generates a new timestamp, strictly greater than any issued or
    /// received before.
    pub fn now(&self) -> Hlc {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock();

        if physical > last.0 {
            *last = (physical, 0);
        } else {
            last.1 = last.1.saturating_add(1);
        }

        Hlc::new(last.0, last.1, self.node_id)
    }

    /// Advances the clock past an observed timestamp.
    ///
    /// Used to seed the clock from ids already persisted in the queue, so a
    /// restarted process never reissues an older id.
    pub fn receive(&self, received: &Hlc) -> Hlc {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock();

        *last = if physical > last.0 && physical > received.wall_ms {
            (physical, 0)
        } else if received.wall_ms > last.0 {
            (received.wall_ms, received.counter.saturating_add(1))
        } else if received.wall_ms == last.0 {
            (last.0, last.1.max(received.counter).saturating_add(1))
        } else {
            (last.0, last.1.saturating_add(1))
        };

        Hlc::new(last.0, last.1, self.node_id)
    }
}

#[cfg(test)]
#[path = "hlc_tests.rs"]
mod tests;
