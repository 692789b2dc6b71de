// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::RegistryError;
use crate::heartbeat::WorkerHeartbeat;
use crate::registry::WorkerRegistry;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Default)]
pub struct InMemoryWorkerRegistry {
    workers: Mutex<HashMap<String, HashMap<String, WorkerHeartbeat>>>,
}

impl InMemoryWorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkerRegistry for InMemoryWorkerRegistry {
    async fn publish_heartbeat(
        &self,
        namespace: &str,
        heartbeat: &WorkerHeartbeat,
        _ttl: Duration,
    ) -> Result<(), RegistryError> {
        self.workers
            .lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(heartbeat.id.clone(), heartbeat.clone());
        Ok(())
    }

    async fn list_live_workers(
        &self,
        namespace: &str,
        max_age: Duration,
    ) -> Result<Vec<WorkerHeartbeat>, RegistryError> {
        let cutoff = chrono::Utc::now() - chrono::Duration::from_std(max_age).unwrap_or_default();
        Ok(self
            .workers
            .lock()
            .get(namespace)
            .map(|workers| {
                workers
                    .values()
                    .filter(|w| w.last_heartbeat >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_worker(
        &self,
        namespace: &str,
        worker_id: &str,
    ) -> Result<Option<WorkerHeartbeat>, RegistryError> {
        Ok(self
            .workers
            .lock()
            .get(namespace)
            .and_then(|w| w.get(worker_id))
            .cloned())
    }

    async fn remove(&self, namespace: &str, worker_id: &str) -> Result<(), RegistryError> {
        if let Some(workers) = self.workers.lock().get_mut(namespace) {
            workers.remove(worker_id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
