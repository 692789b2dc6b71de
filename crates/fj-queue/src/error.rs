// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from queue store operations. `is_transient` classifies the
/// error for the Manager's nack/ack decision in `try(queue)` (spec.md
/// §7): transient I/O is nacked for redelivery, everything else fails
/// the job outright.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("redis connection error: {0}")]
    Connection(String),

    #[error("redis command failed: {0}")]
    Command(String),

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown queue name: {0}")]
    UnknownQueue(String),

    #[error("job not found: {0}")]
    JobNotFound(String),
}

impl QueueError {
    /// Whether the operation can be retried after backing off, as
    /// opposed to indicating a programming/data error that will never
    /// succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueueError::Connection(_) | QueueError::Command(_))
    }
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            QueueError::Connection(err.to_string())
        } else {
            QueueError::Command(err.to_string())
        }
    }
}

impl From<deadpool_redis::PoolError> for QueueError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        QueueError::Connection(err.to_string())
    }
}
