// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `QueueStore` capability (spec.md §4.1): durable multi-consumer
//! queue primitives over a stream-based KV store, with at-least-once
//! delivery, visibility timeouts, cancellation and enqueue-provenance
//! metrics.

use crate::error::QueueError;
use async_trait::async_trait;
use fj_core::job::{EnqueueMeta, Job, JobId, QueueName};
use std::collections::HashMap;
use std::time::Duration;

/// Point-in-time counts for a single queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QueueStats {
    pub pending: u64,
    pub processing: u64,
    pub failed: u64,
}

impl QueueStats {
    pub fn is_busy(&self) -> bool {
        self.pending > 0 || self.processing > 0
    }
}

/// State filter for `list_jobs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobListState {
    Pending,
    Processing,
    Dead,
}

/// Capability set every queue consumer depends on. Implementations are
/// injected (Redis-backed for production, in-memory for tests) — see
/// `fj-core`'s design notes on "interface polymorphism over concrete
/// KV/DB types".
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Appends `payload` to `queue`'s stream with the given enqueue
    /// metadata. Enqueue is atomic: callers never observe a partial
    /// append. Returns a fresh opaque job id.
    async fn enqueue(
        &self,
        queue: QueueName,
        payload: Vec<u8>,
        meta: EnqueueMeta,
    ) -> Result<JobId, QueueError>;

    /// Claims the oldest pending job for this consumer group, installing
    /// a visibility timeout. Returns `None` on timeout without error, so
    /// an empty queue is never surfaced as an error. Two consumers in
    /// the same group never receive the same job.
    async fn dequeue(
        &self,
        queue: QueueName,
        block_timeout: Duration,
    ) -> Result<Option<Job>, QueueError>;

    /// Marks `job_id` as a terminal success and removes it. Idempotent:
    /// acking an id that is not currently in processing is not an error.
    async fn ack(&self, queue: QueueName, job_id: &JobId) -> Result<(), QueueError>;

    /// Returns `job_id` to pending for redelivery, or moves it to the
    /// dead-letter list once `dead_letter_max_attempts` has been
    /// exceeded.
    async fn nack(
        &self,
        queue: QueueName,
        job_id: &JobId,
        dead_letter_max_attempts: u32,
    ) -> Result<(), QueueError>;

    /// Sets a cluster-visible cancel flag for `job_id`. Workers observe
    /// this via `is_canceled` and short-circuit.
    async fn cancel(&self, job_id: &JobId) -> Result<(), QueueError>;

    async fn is_canceled(&self, job_id: &JobId) -> Result<bool, QueueError>;

    async fn get_queue_stats(&self, queue: QueueName) -> Result<QueueStats, QueueError>;

    async fn get_backlog(&self, queue: QueueName, limit: usize) -> Result<Vec<Job>, QueueError>;

    async fn list_jobs(
        &self,
        queue: QueueName,
        state: JobListState,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>, QueueError>;

    /// Per-actor enqueue counts over the trailing `window_minutes`
    /// minutes, for `flight_search`/`bulk_search` rate observability.
    async fn get_enqueue_metrics(
        &self,
        queue: QueueName,
        window_minutes: u32,
    ) -> Result<HashMap<String, u64>, QueueError>;

    /// Out-of-band kill-switch independent of the result-store DB row of
    /// the same name (spec.md §4.7/§6). `running`/`paused` are only
    /// applied when `Some`.
    async fn set_continuous_sweep_control_flags(
        &self,
        running: Option<bool>,
        paused: Option<bool>,
    ) -> Result<(), QueueError>;

    async fn get_continuous_sweep_control_flags(
        &self,
    ) -> Result<ContinuousSweepControlFlags, QueueError>;
}

/// Mirrors the `continuous_sweep:control` JSON key described in spec.md
/// §6.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ContinuousSweepControlFlags {
    pub is_running: bool,
    pub is_paused: bool,
}

impl Default for ContinuousSweepControlFlags {
    fn default() -> Self {
        Self {
            is_running: true,
            is_paused: false,
        }
    }
}
