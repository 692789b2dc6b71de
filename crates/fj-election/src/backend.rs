// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lock primitives `LeaderElector` is built on: set-if-absent with a
//! TTL, compare-value-and-renew, compare-value-and-delete. Modeled as a
//! capability trait so the elector can be driven by an in-memory backend
//! in tests and a Redis backend (SETNX / Lua CAS scripts) in production.

use crate::error::ElectionError;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait LockBackend: Send + Sync + 'static {
    /// Set `key` to `value` with expiry `ttl` only if absent. Returns
    /// whether the lock was acquired.
    async fn try_acquire(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, ElectionError>;

    /// Atomically: if `GET key == value` then `PEXPIRE key ttl`. Returns
    /// whether the renewal applied (false means the lock was lost —
    /// taken by someone else, or expired and never reacquired).
    async fn renew(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, ElectionError>;

    /// Atomically: if `GET key == value` then `DEL key`. Returns whether
    /// the release applied.
    async fn release(&self, key: &str, value: &str) -> Result<bool, ElectionError>;
}

pub const RENEW_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('PEXPIRE', KEYS[1], ARGV[2])
else
    return 0
end
"#;

pub const RELEASE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#;
