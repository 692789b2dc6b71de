// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fj_queue::QueueError;
use fj_registry::RegistryError;
use thiserror::Error;

/// Errors surfaced by the Manager's own orchestration, as distinct
/// from [`crate::handler::HandlerError`] which a job handler returns
/// for a single job.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("manager already started")]
    AlreadyStarted,
}
