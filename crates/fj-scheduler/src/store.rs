// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ScheduleError;
use crate::types::ScheduledJobDef;

/// Persisted recurring-trigger definitions. Kept separate from
/// `ResultStore` because scheduled-job entries are configuration, not a
/// harvested result.
#[async_trait]
pub trait ScheduledJobStore: Send + Sync {
    async fn list_enabled(&self) -> Result<Vec<ScheduledJobDef>, ScheduleError>;

    /// Fetches a single job regardless of its `enabled` flag, so callers
    /// (e.g. `fj schedule enable`) can re-enable a disabled job without
    /// scanning the enabled-only listing.
    async fn get(&self, id: &str) -> Result<ScheduledJobDef, ScheduleError>;

    async fn upsert(&self, def: ScheduledJobDef) -> Result<(), ScheduleError>;

    async fn remove(&self, id: &str) -> Result<(), ScheduleError>;

    async fn update_last_run(&self, id: &str, at: DateTime<Utc>) -> Result<(), ScheduleError>;
}
