// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis key layout (spec.md §6): one stream (modeled as a list +
//! processing zset) per queue, one consumer group, a per-job meta hash,
//! a per-job cancel flag and a per-minute per-actor enqueue counter.

use fj_core::job::QueueName;

pub const JOB_META_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const CANCEL_FLAG_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Keys {
    prefix: String,
}

impl Keys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn pending(&self, queue: QueueName) -> String {
        format!("{}:{}:pending", self.prefix, queue.as_str())
    }

    pub fn processing(&self, queue: QueueName) -> String {
        format!("{}:{}:processing", self.prefix, queue.as_str())
    }

    pub fn dead(&self, queue: QueueName) -> String {
        format!("{}:{}:dead", self.prefix, queue.as_str())
    }

    pub fn job(&self, queue: QueueName, job_id: &str) -> String {
        format!("{}:{}:job:{}", self.prefix, queue.as_str(), job_id)
    }

    pub fn cancel(&self, job_id: &str) -> String {
        format!("{}:cancel:{}", self.prefix, job_id)
    }

    pub fn enqueue_metrics(&self, queue: QueueName, minute_bucket: i64) -> String {
        format!(
            "{}:{}:enqueue:{}",
            self.prefix,
            queue.as_str(),
            minute_bucket
        )
    }

    pub fn continuous_sweep_control(&self) -> String {
        "continuous_sweep:control".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_spec_layout() {
        let keys = Keys::new("fj");
        assert_eq!(keys.pending(QueueName::BulkSearch), "fj:bulk_search:pending");
        assert_eq!(
            keys.processing(QueueName::BulkSearch),
            "fj:bulk_search:processing"
        );
        assert_eq!(keys.dead(QueueName::BulkSearch), "fj:bulk_search:dead");
        assert_eq!(
            keys.job(QueueName::BulkSearch, "abc"),
            "fj:bulk_search:job:abc"
        );
        assert_eq!(keys.cancel("abc"), "fj:cancel:abc");
        assert_eq!(
            keys.continuous_sweep_control(),
            "continuous_sweep:control"
        );
    }
}
