// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error: {0}")]
    Connection(String),
    #[error("database query failed: {0}")]
    Query(String),
    #[error("bulk search not found: {0}")]
    BulkSearchNotFound(String),
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: String, to: String },
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => StoreError::Connection(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}
