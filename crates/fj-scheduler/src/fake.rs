// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::ScheduleError;
use crate::store::ScheduledJobStore;
use crate::types::ScheduledJobDef;

#[derive(Default)]
pub struct InMemoryScheduledJobStore {
    jobs: Mutex<HashMap<String, ScheduledJobDef>>,
}

impl InMemoryScheduledJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduledJobStore for InMemoryScheduledJobStore {
    async fn list_enabled(&self) -> Result<Vec<ScheduledJobDef>, ScheduleError> {
        Ok(self.jobs.lock().values().filter(|j| j.enabled).cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<ScheduledJobDef, ScheduleError> {
        self.jobs
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))
    }

    async fn upsert(&self, def: ScheduledJobDef) -> Result<(), ScheduleError> {
        self.jobs.lock().insert(def.id.clone(), def);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), ScheduleError> {
        self.jobs.lock().remove(id);
        Ok(())
    }

    async fn update_last_run(&self, id: &str, at: DateTime<Utc>) -> Result<(), ScheduleError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(id).ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;
        job.last_run = Some(at);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
