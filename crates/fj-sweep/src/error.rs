// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fj_provider::ProviderError;
use fj_queue::QueueError;
use fj_resultstore::StoreError;
use thiserror::Error;

/// Errors surfaced by `PriceGraphSweep`/`ContinuousSweep` (spec.md §7).
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid sweep payload: {0}")]
    Validation(String),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("result store error: {0}")]
    Store(#[from] StoreError),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl SweepError {
    pub fn is_transient(&self) -> bool {
        match self {
            SweepError::Queue(err) => err.is_transient(),
            SweepError::Store(err) => err.is_transient(),
            SweepError::Provider(err) => err.is_transient(),
            SweepError::Validation(_) => false,
        }
    }
}
