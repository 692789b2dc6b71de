// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed `WorkerRegistry` following the wire layout in spec.md
//! §6: a sorted set scored by last-heartbeat unix seconds for liveness
//! range queries, plus a per-worker hash (TTL = 3x heartbeat TTL).

use crate::error::RegistryError;
use crate::heartbeat::{WorkerHeartbeat, WorkerStatus};
use crate::registry::WorkerRegistry;
use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;

pub struct RedisWorkerRegistry {
    pool: Pool,
}

impl RedisWorkerRegistry {
    pub fn new(redis_url: &str) -> Result<Self, RegistryError> {
        let cfg = PoolConfig::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RegistryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    fn heartbeats_key(namespace: &str) -> String {
        format!("worker_registry:{namespace}:heartbeats")
    }

    fn worker_key(namespace: &str, worker_id: &str) -> String {
        format!("worker_registry:{namespace}:worker:{worker_id}")
    }

    fn parse_status(s: &str) -> WorkerStatus {
        match s {
            "active" => WorkerStatus::Active,
            "processing" => WorkerStatus::Processing,
            "error" => WorkerStatus::Error,
            "stopping" => WorkerStatus::Stopping,
            "stopped" => WorkerStatus::Stopped,
            _ => WorkerStatus::Starting,
        }
    }
}

#[async_trait]
impl WorkerRegistry for RedisWorkerRegistry {
    async fn publish_heartbeat(
        &self,
        namespace: &str,
        heartbeat: &WorkerHeartbeat,
        ttl: Duration,
    ) -> Result<(), RegistryError> {
        let mut conn = self.pool.get().await?;
        let worker_key = Self::worker_key(namespace, &heartbeat.id);

        redis::pipe()
            .atomic()
            .hset(&worker_key, "id", &heartbeat.id)
            .hset(&worker_key, "hostname", &heartbeat.hostname)
            .hset(&worker_key, "status", heartbeat.status.as_str())
            .hset(
                &worker_key,
                "current_job",
                heartbeat.current_job.clone().unwrap_or_default(),
            )
            .hset(&worker_key, "processed_jobs", heartbeat.processed_jobs)
            .hset(&worker_key, "concurrency", heartbeat.concurrency as u64)
            .hset(&worker_key, "started_at", heartbeat.started_at.to_rfc3339())
            .hset(
                &worker_key,
                "last_heartbeat",
                heartbeat.last_heartbeat.to_rfc3339(),
            )
            .hset(&worker_key, "version", &heartbeat.version)
            .expire(&worker_key, (ttl.as_secs() * 3) as i64)
            .zadd(
                Self::heartbeats_key(namespace),
                &heartbeat.id,
                heartbeat.last_heartbeat.timestamp(),
            )
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn list_live_workers(
        &self,
        namespace: &str,
        max_age: Duration,
    ) -> Result<Vec<WorkerHeartbeat>, RegistryError> {
        let mut conn = self.pool.get().await?;
        let cutoff = chrono::Utc::now().timestamp() - max_age.as_secs() as i64;
        let ids: Vec<String> = conn
            .zrangebyscore(Self::heartbeats_key(namespace), cutoff, "+inf")
            .await?;
        let mut workers = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(w) = self.get_worker(namespace, &id).await? {
                workers.push(w);
            }
        }
        Ok(workers)
    }

    async fn get_worker(
        &self,
        namespace: &str,
        worker_id: &str,
    ) -> Result<Option<WorkerHeartbeat>, RegistryError> {
        let mut conn = self.pool.get().await?;
        let fields: HashMap<String, String> =
            conn.hgetall(Self::worker_key(namespace, worker_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(WorkerHeartbeat {
            id: fields.get("id").cloned().unwrap_or_default(),
            hostname: fields.get("hostname").cloned().unwrap_or_default(),
            status: Self::parse_status(fields.get("status").map(String::as_str).unwrap_or("")),
            current_job: fields
                .get("current_job")
                .filter(|s| !s.is_empty())
                .cloned(),
            processed_jobs: fields
                .get("processed_jobs")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            concurrency: fields
                .get("concurrency")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            started_at: fields
                .get("started_at")
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&chrono::Utc))
                .unwrap_or_else(chrono::Utc::now),
            last_heartbeat: fields
                .get("last_heartbeat")
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&chrono::Utc))
                .unwrap_or_else(chrono::Utc::now),
            version: fields.get("version").cloned().unwrap_or_default(),
        }))
    }

    async fn remove(&self, namespace: &str, worker_id: &str) -> Result<(), RegistryError> {
        let mut conn = self.pool.get().await?;
        redis::pipe()
            .atomic()
            .zrem(Self::heartbeats_key(namespace), worker_id)
            .del(Self::worker_key(namespace, worker_id))
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }
}
