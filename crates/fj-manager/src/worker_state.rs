// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker-slot state the Manager reports through `WorkerRegistry`
//! heartbeats.

use fj_registry::heartbeat::{WorkerHeartbeat, WorkerStatus};
use parking_lot::Mutex;

/// One polling loop's published identity and counters. The Manager
/// owns one slot per concurrency unit (`Config::concurrency`); each
/// slot heartbeats under its own `{worker_id}-{index}` key so a single
/// process's live-worker count in `WorkerRegistry::list_live_workers`
/// matches its concurrency.
pub struct WorkerSlot {
    id: String,
    hostname: String,
    state: Mutex<WorkerHeartbeat>,
}

impl WorkerSlot {
    pub fn new(worker_id: &str, index: usize, hostname: &str) -> Self {
        let id = format!("{worker_id}-{index}");
        let heartbeat = WorkerHeartbeat::starting(id.clone(), hostname.to_string(), 1);
        Self {
            id,
            hostname: hostname.to_string(),
            state: Mutex::new(heartbeat),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_active(&self) {
        let mut hb = self.state.lock();
        hb.status = WorkerStatus::Active;
        hb.current_job = None;
    }

    pub fn set_processing(&self, job_id: &str) {
        let mut hb = self.state.lock();
        hb.status = WorkerStatus::Processing;
        hb.current_job = Some(job_id.to_string());
    }

    pub fn record_completed(&self) {
        let mut hb = self.state.lock();
        hb.processed_jobs += 1;
        hb.current_job = None;
        hb.status = WorkerStatus::Active;
    }

    pub fn set_error(&self) {
        self.state.lock().status = WorkerStatus::Error;
    }

    pub fn set_stopping(&self) {
        let mut hb = self.state.lock();
        hb.status = WorkerStatus::Stopping;
        hb.current_job = None;
    }

    /// Snapshot suitable for publishing; stamps `last_heartbeat` to now.
    pub fn snapshot(&self) -> WorkerHeartbeat {
        let mut hb = self.state.lock().clone();
        hb.last_heartbeat = chrono::Utc::now();
        hb
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

#[cfg(test)]
#[path = "worker_state_tests.rs"]
mod tests;
