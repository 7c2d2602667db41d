//! Time Module
//!
//! Write timestamps, TTLs and the clock the engine reads "now" from.
//!
//! ## Units
//! - `Timestamp`: microseconds since the Unix epoch (the CQL write-time unit)
//! - `Ttl`: whole seconds, strictly positive
//!
//! Expiry is never scheduled. A cell written at `ts` with TTL `t` is simply
//! dead for every read time `T >= ts + t`.

mod clock;

pub use clock::{ManualClock, SystemClock, TimeSource};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

const MICROS_PER_MILLI: i64 = 1_000;
const MICROS_PER_SEC: i64 = 1_000_000;

/// A write or read timestamp, in microseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch
    pub const EPOCH: Timestamp = Timestamp(0);

    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis.saturating_mul(MICROS_PER_MILLI))
    }

    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(MICROS_PER_SEC))
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// The instant a record written at `self` with `ttl` stops being live
    pub fn expiry_after(self, ttl: Ttl) -> Timestamp {
        Timestamp(self.0.saturating_add(i64::from(ttl.as_secs()) * MICROS_PER_SEC))
    }

    /// Shift forward by a wall-clock duration (saturating)
    pub fn saturating_add(self, delta: Duration) -> Timestamp {
        let micros = i64::try_from(delta.as_micros()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(micros))
    }

    /// Time left between `self` and a later instant, or None if already past
    pub fn until(self, later: Timestamp) -> Option<Duration> {
        let delta = later.0.checked_sub(self.0)?;
        if delta <= 0 {
            return None;
        }
        Some(Duration::from_micros(delta as u64))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Time-to-live in whole seconds. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ttl(u32);

impl Ttl {
    /// Twenty years, the largest TTL CQL accepts
    pub const MAX_DEFAULT: Ttl = Ttl(630_720_000);

    /// Validate a TTL as written in `USING TTL <n>`
    pub fn from_secs(secs: i64) -> Result<Self> {
        if secs <= 0 {
            return Err(AtlasError::invalid_write(format!(
                "TTL must be a positive number of seconds, got {}",
                secs
            )));
        }
        let secs = u32::try_from(secs).map_err(|_| {
            AtlasError::invalid_write(format!("TTL of {} seconds is out of range", secs))
        })?;
        Ok(Ttl(secs))
    }

    pub const fn as_secs(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
