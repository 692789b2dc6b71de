// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production `QueueStore` backed by Redis, following the wire layout in
//! spec.md §6.

use crate::error::QueueError;
use crate::keys::{Keys, CANCEL_FLAG_TTL_SECS, JOB_META_TTL_SECS};
use crate::scripts::{ACK_SCRIPT, DEQUEUE_SCRIPT, NACK_SCRIPT};
use crate::store::{ContinuousSweepControlFlags, JobListState, QueueStats, QueueStore};
use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use fj_core::job::{EnqueueMeta, Job, JobId, JobType, QueueName};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

pub struct RedisQueueStore {
    pool: Pool,
    keys: Keys,
}

impl RedisQueueStore {
    pub fn new(redis_url: &str, stream_prefix: impl Into<String>) -> Result<Self, QueueError> {
        let cfg = PoolConfig::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| QueueError::Connection(e.to_string()))?;
        Ok(Self {
            pool,
            keys: Keys::new(stream_prefix),
        })
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, QueueError> {
        Ok(self.pool.get().await?)
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

    async fn load_job(&self, queue: QueueName, job_id: &str) -> Result<Option<Job>, QueueError> {
        let mut conn = self.conn().await?;
        let hash_key = self.keys.job(queue, job_id);
        let fields: HashMap<String, String> = conn.hgetall(&hash_key).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        let payload = fields
            .get("payload")
            .map(|p| p.as_bytes().to_vec())
            .unwrap_or_default();
        let meta: EnqueueMeta = fields
            .get("meta")
            .and_then(|m| serde_json::from_str(m).ok())
            .unwrap_or_default();
        let attempts = fields
            .get("attempts")
            .and_then(|a| a.parse().ok())
            .unwrap_or(0);
        let enqueued_at = fields
            .get("enqueued_at")
            .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&chrono::Utc))
            .unwrap_or_else(chrono::Utc::now);

        Ok(Some(Job {
            id: JobId::new(job_id),
            queue,
            job_type: Self::job_type_for_queue(queue),
            payload,
            meta,
            attempts,
            enqueued_at,
        }))
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn enqueue(
        &self,
        queue: QueueName,
        payload: Vec<u8>,
        meta: EnqueueMeta,
    ) -> Result<JobId, QueueError> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let mut conn = self.conn().await?;
        let now = chrono::Utc::now();
        let hash_key = self.keys.job(queue, &job_id);

        redis::pipe()
            .atomic()
            .hset(&hash_key, "payload", String::from_utf8_lossy(&payload).into_owned())
            .hset(&hash_key, "meta", serde_json::to_string(&meta)?)
            .hset(&hash_key, "attempts", 0)
            .hset(&hash_key, "enqueued_at", now.to_rfc3339())
            .expire(&hash_key, JOB_META_TTL_SECS)
            .rpush(self.keys.pending(queue), &job_id)
            .hincr(
                self.keys.enqueue_metrics(queue, now.timestamp() / 60),
                meta.actor.clone(),
                1,
            )
            .expire(self.keys.enqueue_metrics(queue, now.timestamp() / 60), 3600)
            .query_async::<()>(&mut conn)
            .await?;

        tracing::debug!(queue = %queue, job_id = %job_id, actor = %meta.actor, "enqueued job");
        Ok(JobId::new(job_id))
    }

    async fn dequeue(
        &self,
        queue: QueueName,
        block_timeout: Duration,
    ) -> Result<Option<Job>, QueueError> {
        let mut conn = self.conn().await?;
        let now = chrono::Utc::now().timestamp_millis();
        // block_timeout governs polling cadence at the Manager level;
        // here we attempt one non-blocking claim per call.
        let _ = block_timeout;
        let deadline = now + 45_000;

        let script = redis::Script::new(DEQUEUE_SCRIPT);
        let result: redis::Value = script
            .key(self.keys.pending(queue))
            .key(self.keys.processing(queue))
            .arg(now)
            .arg(deadline)
            .arg(format!("{}:{}:job:", "fj", queue.as_str()))
            .invoke_async(&mut conn)
            .await?;

        let job_id = match result {
            redis::Value::BulkString(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            redis::Value::SimpleString(s) => s,
            _ => return Ok(None),
        };

        self.load_job(queue, &job_id).await
    }

    async fn ack(&self, queue: QueueName, job_id: &JobId) -> Result<(), QueueError> {
        let mut conn = self.conn().await?;
        let script = redis::Script::new(ACK_SCRIPT);
        let _: i64 = script
            .key(self.keys.processing(queue))
            .arg(job_id.as_str())
            .invoke_async(&mut conn)
            .await?;
        let _: () = conn.del(self.keys.job(queue, job_id.as_str())).await?;
        Ok(())
    }

    async fn nack(
        &self,
        queue: QueueName,
        job_id: &JobId,
        dead_letter_max_attempts: u32,
    ) -> Result<(), QueueError> {
        let mut conn = self.conn().await?;
        let script = redis::Script::new(NACK_SCRIPT);
        let _: String = script
            .key(self.keys.processing(queue))
            .key(self.keys.pending(queue))
            .key(self.keys.dead(queue))
            .arg(job_id.as_str())
            .arg(dead_letter_max_attempts)
            .arg(self.keys.job(queue, job_id.as_str()))
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn cancel(&self, job_id: &JobId) -> Result<(), QueueError> {
        let mut conn = self.conn().await?;
        let key = self.keys.cancel(job_id.as_str());
        let _: () = conn.set_ex(&key, "1", CANCEL_FLAG_TTL_SECS as u64).await?;
        Ok(())
    }

    async fn is_canceled(&self, job_id: &JobId) -> Result<bool, QueueError> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(self.keys.cancel(job_id.as_str())).await?;
        Ok(exists)
    }

    async fn get_queue_stats(&self, queue: QueueName) -> Result<QueueStats, QueueError> {
        let mut conn = self.conn().await?;
        let pending: u64 = conn.llen(self.keys.pending(queue)).await?;
        let processing: u64 = conn.zcard(self.keys.processing(queue)).await?;
        let failed: u64 = conn.llen(self.keys.dead(queue)).await?;
        Ok(QueueStats {
            pending,
            processing,
            failed,
        })
    }

    async fn get_backlog(&self, queue: QueueName, limit: usize) -> Result<Vec<Job>, QueueError> {
        let mut conn = self.conn().await?;
        let ids: Vec<String> = conn
            .lrange(self.keys.pending(queue), 0, limit.saturating_sub(1) as isize)
            .await?;
        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(job) = self.load_job(queue, &id).await? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    async fn list_jobs(
        &self,
        queue: QueueName,
        state: JobListState,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>, QueueError> {
        let mut conn = self.conn().await?;
        let start = offset as isize;
        let stop = (offset + limit).saturating_sub(1) as isize;
        let ids: Vec<String> = match state {
            JobListState::Pending => conn.lrange(self.keys.pending(queue), start, stop).await?,
            JobListState::Dead => conn.lrange(self.keys.dead(queue), start, stop).await?,
            JobListState::Processing => {
                conn.zrange(self.keys.processing(queue), start, stop).await?
            }
        };
        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(job) = self.load_job(queue, &id).await? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    async fn get_enqueue_metrics(
        &self,
        queue: QueueName,
        window_minutes: u32,
    ) -> Result<HashMap<String, u64>, QueueError> {
        let mut conn = self.conn().await?;
        let now_minute = chrono::Utc::now().timestamp() / 60;
        let mut totals: HashMap<String, u64> = HashMap::new();
        for offset in 0..window_minutes as i64 {
            let bucket = now_minute - offset;
            let fields: HashMap<String, u64> =
                conn.hgetall(self.keys.enqueue_metrics(queue, bucket)).await?;
            for (actor, count) in fields {
                *totals.entry(actor).or_insert(0) += count;
            }
        }
        Ok(totals)
    }

    async fn set_continuous_sweep_control_flags(
        &self,
        running: Option<bool>,
        paused: Option<bool>,
    ) -> Result<(), QueueError> {
        let mut conn = self.conn().await?;
        let key = self.keys.continuous_sweep_control();
        let mut current = self.get_continuous_sweep_control_flags().await?;
        if let Some(r) = running {
            current.is_running = r;
        }
        if let Some(p) = paused {
            current.is_paused = p;
        }
        let value = serde_json::json!({
            "is_running": current.is_running,
            "is_paused": current.is_paused,
            "last_updated": chrono::Utc::now().to_rfc3339(),
            "source": "fj-queue",
        });
        let _: () = conn.set(&key, value.to_string()).await?;
        Ok(())
    }

    async fn get_continuous_sweep_control_flags(
        &self,
    ) -> Result<ContinuousSweepControlFlags, QueueError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(self.keys.continuous_sweep_control()).await?;
        let Some(raw) = raw else {
            return Ok(ContinuousSweepControlFlags::default());
        };
        let value: serde_json::Value =
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
        Ok(ContinuousSweepControlFlags {
            is_running: value
                .get("is_running")
                .and_then(|v| v.as_bool())
                .unwrap_or(true),
            is_paused: value
                .get("is_paused")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        })
    }
}

impl FromStr for RedisQueueStore {
    type Err = QueueError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        Self::new(url, "fj")
    }
}
