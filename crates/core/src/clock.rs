// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! Used for workspace fallback keys and for command timing in logs.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    inner: Arc<Mutex<(Instant, u64)>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::at_epoch_ms(1_000_000)
    }

    pub fn at_epoch_ms(ms: u64) -> Self {
        Self { inner: Arc::new(Mutex::new((Instant::now(), ms))) }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.0 += duration;
        inner.1 += duration.as_millis() as u64;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().0
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().1
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
