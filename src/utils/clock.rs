// src/utils/clock.rs
//! Time sources for the registry.
//!
//! The registry never reads the wall clock directly. It asks a [`Clock`],
//! which lets tests drive expiry with simulated time.

use chrono::Utc;
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current time in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-1970 clocks are treated as the epoch
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for simulated time.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: u64) -> Self {
        ManualClock { now: AtomicU64::new(start) }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
