// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test builders, gated behind `test-support` so downstream
//! crates' test suites can construct fixtures without duplicating
//! boilerplate.

use crate::job::{EnqueueMeta, Job, JobId, JobType, QueueName};
use chrono::Utc;

/// Builds a `Job` with sensible defaults, overridable field-by-field.
pub struct JobBuilder {
    id: String,
    queue: QueueName,
    job_type: JobType,
    payload: Vec<u8>,
    meta: EnqueueMeta,
    attempts: u32,
}

impl JobBuilder {
    pub fn new(queue: QueueName, job_type: JobType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            queue,
            job_type,
            payload: b"{}".to_vec(),
            meta: EnqueueMeta::for_actor("test"),
            attempts: 0,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn payload_json(mut self, value: serde_json::Value) -> Self {
        self.payload = serde_json::to_vec(&value).unwrap_or_default();
        self
    }

    pub fn meta(mut self, meta: EnqueueMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn build(self) -> Job {
        Job {
            id: JobId::new(self.id),
            queue: self.queue,
            job_type: self.job_type,
            payload: self.payload,
            meta: self.meta,
            attempts: self.attempts,
            enqueued_at: Utc::now(),
        }
    }
}
