// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("redis connection error: {0}")]
    Connection(String),
    #[error("redis command failed: {0}")]
    Command(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for RegistryError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            RegistryError::Connection(err.to_string())
        } else {
            RegistryError::Command(err.to_string())
        }
    }
}

impl From<deadpool_redis::PoolError> for RegistryError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        RegistryError::Connection(err.to_string())
    }
}
