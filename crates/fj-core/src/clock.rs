// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so scheduling, visibility timeouts and leader TTLs
//! can be driven deterministically in tests.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A source of wall-clock time.
///
/// Every component that computes a deadline (visibility timeout, leader
/// TTL, heartbeat expiry, schedule firing) takes a `Clock` rather than
/// calling `Utc::now()` directly so tests can advance time deterministically.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests. Starts at a fixed instant and only
/// advances when told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let mut guard = self.inner.lock();
        *guard += chrono::Duration::from_std(delta).unwrap_or(chrono::Duration::zero());
    }

    pub fn set(&self, when: DateTime<Utc>) {
        *self.inner.lock() = when;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default())
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.inner.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
