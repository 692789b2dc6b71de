// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::backend::{LockBackend, RELEASE_SCRIPT, RENEW_SCRIPT};
use crate::error::ElectionError;
use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

pub struct RedisLockBackend {
    pool: Pool,
}

impl RedisLockBackend {
    pub fn new(redis_url: &str) -> Result<Self, ElectionError> {
        let cfg = PoolConfig::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| ElectionError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl LockBackend for RedisLockBackend {
    async fn try_acquire(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, ElectionError> {
        let mut conn = self.pool.get().await?;
        let acquired: bool = conn
            .set_options(
                key,
                value,
                redis::SetOptions::default()
                    .conditional_set(redis::ExistenceCheck::NX)
                    .with_expiration(redis::SetExpiry::PX(ttl.as_millis() as u64)),
            )
            .await
            .unwrap_or(false);
        Ok(acquired)
    }

    async fn renew(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, ElectionError> {
        let mut conn = self.pool.get().await?;
        let script = redis::Script::new(RENEW_SCRIPT);
        let renewed: i64 = script
            .key(key)
            .arg(value)
            .arg(ttl.as_millis() as u64)
            .invoke_async(&mut conn)
            .await?;
        Ok(renewed == 1)
    }

    async fn release(&self, key: &str, value: &str) -> Result<bool, ElectionError> {
        let mut conn = self.pool.get().await?;
        let script = redis::Script::new(RELEASE_SCRIPT);
        let released: i64 = script.key(key).arg(value).invoke_async(&mut conn).await?;
        Ok(released == 1)
    }
}
