// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock backend for tests — a single `Mutex`-guarded
//! `(value, expiry)` slot per key, with a wall-clock TTL so tests can
//! simulate expiry by sleeping past it or by forcing the value with
//! [`InMemoryLockBackend::force_set`].

use crate::backend::LockBackend;
use crate::error::ElectionError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct InMemoryLockBackend {
    locks: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryLockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: simulate another process stealing or clearing the key
    /// out from under the current holder, independent of TTL.
    pub fn force_set(&self, key: &str, value: impl Into<String>, ttl: Duration) {
        self.locks
            .lock()
            .insert(key.to_string(), (value.into(), Instant::now() + ttl));
    }

    pub fn force_clear(&self, key: &str) {
        self.locks.lock().remove(key);
    }

    fn is_live(entry: &(String, Instant)) -> bool {
        entry.1 > Instant::now()
    }
}

#[async_trait]
impl LockBackend for InMemoryLockBackend {
    async fn try_acquire(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, ElectionError> {
        let mut locks = self.locks.lock();
        let vacant = match locks.get(key) {
            Some(entry) => !Self::is_live(entry),
            None => true,
        };
        if vacant {
            locks.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        }
        Ok(vacant)
    }

    async fn renew(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, ElectionError> {
        let mut locks = self.locks.lock();
        match locks.get(key) {
            Some((current, _)) if current == value => {
                locks.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, key: &str, value: &str) -> Result<bool, ElectionError> {
        let mut locks = self.locks.lock();
        match locks.get(key) {
            Some((current, _)) if current == value => {
                locks.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
