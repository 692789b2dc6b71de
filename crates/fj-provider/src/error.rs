// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `FlightsProvider` boundary. The concrete
/// scraper/client this wraps is out of scope (spec.md §1) — callers only
/// see this classification.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider call timed out")]
    Timeout,
    #[error("provider request was canceled")]
    Canceled,
    #[error("provider returned an error: {0}")]
    Upstream(String),
    #[error("provider response could not be parsed: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Validation-shaped errors (malformed upstream payloads) are not
    /// worth retrying; timeouts and upstream 5xx-equivalents are.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Timeout | ProviderError::Upstream(_))
    }
}
