// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("lock backend connection error: {0}")]
    Connection(String),
    #[error("lock backend command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for ElectionError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            ElectionError::Connection(err.to_string())
        } else {
            ElectionError::Command(err.to_string())
        }
    }
}

impl From<deadpool_redis::PoolError> for ElectionError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        ElectionError::Connection(err.to_string())
    }
}
