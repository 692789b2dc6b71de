// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `QueueStore` used by every other crate's test suite plus
//! the `fj-specs` integration tests. Implements the exact same
//! visibility-timeout, cancellation and dead-letter semantics as
//! `RedisQueueStore`, driven by an injectable `Clock` so visibility
//! expiry can be tested deterministically.

use crate::error::QueueError;
use crate::store::{ContinuousSweepControlFlags, JobListState, QueueStats, QueueStore};
use async_trait::async_trait;
use fj_core::clock::{Clock, SystemClock};
use fj_core::job::{EnqueueMeta, Job, JobId, JobType, QueueName};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    processing: HashMap<String, (Job, chrono::DateTime<chrono::Utc>)>,
    dead: Vec<Job>,
    enqueue_counts: HashMap<i64, HashMap<String, u64>>,
}

struct Inner {
    queues: HashMap<QueueName, QueueState>,
    cancel_flags: HashSet<String>,
    control: ContinuousSweepControlFlags,
}

/// In-memory `QueueStore`. `visibility_timeout` defaults to the spec's
/// 45s but is overridable for tests that want to exercise reclaim
/// quickly.
pub struct InMemoryQueueStore<C: Clock = SystemClock> {
    clock: C,
    visibility_timeout: Duration,
    inner: Mutex<Inner>,
}

impl InMemoryQueueStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock, Duration::from_secs(45))
    }
}

impl Default for InMemoryQueueStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryQueueStore<C> {
    pub fn with_clock(clock: C, visibility_timeout: Duration) -> Self {
        Self {
            clock,
            visibility_timeout,
            inner: Mutex::new(Inner {
                queues: HashMap::new(),
                cancel_flags: HashSet::new(),
                control: ContinuousSweepControlFlags::default(),
            }),
        }
    }

    fn job_type_for_queue(queue: QueueName) -> JobType {
        match queue {
            QueueName::FlightSearch => JobType::FlightSearch,
            QueueName::BulkSearch => JobType::BulkSearch,
            QueueName::BulkSearchRoute => JobType::BulkSearchRoute,
            QueueName::PriceGraphSweep => JobType::PriceGraphSweep,
            QueueName::ContinuousPriceGraph => JobType::ContinuousPriceGraph,
            QueueName::ScheduledJobs => JobType::ScheduledJob,
        }
    }

    /// Reaps processing entries whose visibility deadline has passed
    /// back onto the tail of pending. Must be called with the inner
    /// lock held.
    fn reap(state: &mut QueueState, now: chrono::DateTime<chrono::Utc>) {
        let expired: Vec<String> = state
            .processing
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            if let Some((mut job, _)) = state.processing.remove(&id) {
                job.attempts += 1;
                state.pending.push_back(job);
            }
        }
    }
}

#[async_trait]
impl<C: Clock> QueueStore for InMemoryQueueStore<C> {
    async fn enqueue(
        &self,
        queue: QueueName,
        payload: Vec<u8>,
        meta: EnqueueMeta,
    ) -> Result<JobId, QueueError> {
        let now = self.clock.now();
        let job = Job {
            id: JobId::new(uuid::Uuid::new_v4().to_string()),
            queue,
            job_type: Self::job_type_for_queue(queue),
            payload,
            meta: meta.clone(),
            attempts: 0,
            enqueued_at: now,
        };
        let id = job.id.clone();
        let mut inner = self.inner.lock();
        let state = inner.queues.entry(queue).or_default();
        state
            .enqueue_counts
            .entry(now.timestamp() / 60)
            .or_default()
            .entry(meta.actor)
            .and_modify(|c| *c += 1)
            .or_insert(1);
        state.pending.push_back(job);
        Ok(id)
    }

    async fn dequeue(
        &self,
        queue: QueueName,
        _block_timeout: Duration,
    ) -> Result<Option<Job>, QueueError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let state = inner.queues.entry(queue).or_default();
        Self::reap(state, now);
        let Some(mut job) = state.pending.pop_front() else {
            return Ok(None);
        };
        job.attempts += 1;
        let deadline = now + chrono::Duration::from_std(self.visibility_timeout).unwrap_or_default();
        state
            .processing
            .insert(job.id.as_str().to_string(), (job.clone(), deadline));
        Ok(Some(job))
    }

    async fn ack(&self, queue: QueueName, job_id: &JobId) -> Result<(), QueueError> {
        let mut inner = self.inner.lock();
        let state = inner.queues.entry(queue).or_default();
        state.processing.remove(job_id.as_str());
        Ok(())
    }

    async fn nack(
        &self,
        queue: QueueName,
        job_id: &JobId,
        dead_letter_max_attempts: u32,
    ) -> Result<(), QueueError> {
        let mut inner = self.inner.lock();
        let state = inner.queues.entry(queue).or_default();
        let Some((job, _)) = state.processing.remove(job_id.as_str()) else {
            return Ok(());
        };
        if job.attempts >= dead_letter_max_attempts {
            state.dead.push(job);
        } else {
            state.pending.push_back(job);
        }
        Ok(())
    }

    async fn cancel(&self, job_id: &JobId) -> Result<(), QueueError> {
        self.inner.lock().cancel_flags.insert(job_id.as_str().to_string());
        Ok(())
    }

    async fn is_canceled(&self, job_id: &JobId) -> Result<bool, QueueError> {
        Ok(self.inner.lock().cancel_flags.contains(job_id.as_str()))
    }

    async fn get_queue_stats(&self, queue: QueueName) -> Result<QueueStats, QueueError> {
        let mut inner = self.inner.lock();
        let now = self.clock.now();
        let state = inner.queues.entry(queue).or_default();
        Self::reap(state, now);
        Ok(QueueStats {
            pending: state.pending.len() as u64,
            processing: state.processing.len() as u64,
            failed: state.dead.len() as u64,
        })
    }

    async fn get_backlog(&self, queue: QueueName, limit: usize) -> Result<Vec<Job>, QueueError> {
        let inner = self.inner.lock();
        Ok(inner
            .queues
            .get(&queue)
            .map(|s| s.pending.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_jobs(
        &self,
        queue: QueueName,
        state: JobListState,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>, QueueError> {
        let inner = self.inner.lock();
        let Some(qs) = inner.queues.get(&queue) else {
            return Ok(Vec::new());
        };
        let jobs: Vec<Job> = match state {
            JobListState::Pending => qs.pending.iter().cloned().collect(),
            JobListState::Processing => qs.processing.values().map(|(j, _)| j.clone()).collect(),
            JobListState::Dead => qs.dead.clone(),
        };
        Ok(jobs.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_enqueue_metrics(
        &self,
        queue: QueueName,
        window_minutes: u32,
    ) -> Result<HashMap<String, u64>, QueueError> {
        let inner = self.inner.lock();
        let now_minute = self.clock.now().timestamp() / 60;
        let mut totals = HashMap::new();
        if let Some(state) = inner.queues.get(&queue) {
            for offset in 0..window_minutes as i64 {
                if let Some(bucket) = state.enqueue_counts.get(&(now_minute - offset)) {
                    for (actor, count) in bucket {
                        *totals.entry(actor.clone()).or_insert(0) += count;
                    }
                }
            }
        }
        Ok(totals)
    }

    async fn set_continuous_sweep_control_flags(
        &self,
        running: Option<bool>,
        paused: Option<bool>,
    ) -> Result<(), QueueError> {
        let mut inner = self.inner.lock();
        if let Some(r) = running {
            inner.control.is_running = r;
        }
        if let Some(p) = paused {
            inner.control.is_paused = p;
        }
        Ok(())
    }

    async fn get_continuous_sweep_control_flags(
        &self,
    ) -> Result<ContinuousSweepControlFlags, QueueError> {
        Ok(self.inner.lock().control)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
