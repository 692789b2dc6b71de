// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat publication/discovery for live workers (spec.md §4, "WorkerRegistry").

use crate::error::RegistryError;
use crate::heartbeat::WorkerHeartbeat;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait WorkerRegistry: Send + Sync {
    /// Publishes (or overwrites) this worker's heartbeat. `ttl` is
    /// applied to the backing record; a worker that stops heartbeating
    /// silently ages out.
    async fn publish_heartbeat(
        &self,
        namespace: &str,
        heartbeat: &WorkerHeartbeat,
        ttl: Duration,
    ) -> Result<(), RegistryError>;

    /// Workers whose last heartbeat is within `max_age` of now.
    async fn list_live_workers(
        &self,
        namespace: &str,
        max_age: Duration,
    ) -> Result<Vec<WorkerHeartbeat>, RegistryError>;

    async fn get_worker(
        &self,
        namespace: &str,
        worker_id: &str,
    ) -> Result<Option<WorkerHeartbeat>, RegistryError>;

    async fn remove(&self, namespace: &str, worker_id: &str) -> Result<(), RegistryError>;
}
