// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fj_provider::ProviderError;
use fj_queue::QueueError;
use fj_resultstore::StoreError;
use thiserror::Error;

/// Errors surfaced by `BulkCoordinator`/`RouteWorker` (spec.md §7).
/// `is_transient` drives the Manager's nack/ack decision for jobs on
/// `bulk_search`/`bulk_search_route`.
#[derive(Debug, Error)]
pub enum BulkError {
    #[error("invalid bulk search request: {0}")]
    Validation(String),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("result store error: {0}")]
    Store(#[from] StoreError),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("fan-out enqueued zero routes")]
    EmptyFanOut,
}

impl BulkError {
    pub fn is_transient(&self) -> bool {
        match self {
            BulkError::Queue(err) => err.is_transient(),
            BulkError::Store(err) => err.is_transient(),
            BulkError::Provider(err) => err.is_transient(),
            BulkError::Validation(_) | BulkError::EmptyFanOut => false,
        }
    }
}
