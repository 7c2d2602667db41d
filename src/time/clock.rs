//! Clocks
//!
//! `SystemClock` for production, `ManualClock` for deterministic tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::Timestamp;

/// Supplies the current time to the engine
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, made strictly increasing per instance
///
/// Two calls never return the same value, so writes issued through one
/// engine never tie on timestamp even when the OS clock is coarse or
/// steps backwards.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn wall_micros() -> i64 {
        // Clocks set before 1970 read as the epoch.
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX)
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = Self::wall_micros();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Timestamp::from_micros(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start.as_micros()),
        }
    }

    /// Jump to an absolute time (may move backwards)
    pub fn set(&self, at: Timestamp) {
        self.now.store(at.as_micros(), Ordering::SeqCst);
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: Duration) {
        let micros = i64::try_from(delta.as_micros()).unwrap_or(i64::MAX);
        let mut prev = self.now.load(Ordering::SeqCst);
        loop {
            match self.now.compare_exchange_weak(
                prev,
                prev.saturating_add(micros),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::EPOCH)
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.now.load(Ordering::SeqCst))
    }
}
