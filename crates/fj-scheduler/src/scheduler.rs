// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fires `bulk_search` jobs on the cadence described by each
//! [`crate::ScheduledJobDef`]'s friendly schedule string (spec.md §4.3).
//! Runs only in the leader process — `fj-manager` gates `start`/`stop`
//! on the leader-election callbacks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use fj_core::{BulkSearchRequest, Clock, EnqueueMeta, QueueName};
use fj_queue::QueueStore;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use crate::error::ScheduleError;
use crate::friendly::{parse_friendly, CronExpr};
use crate::store::ScheduledJobStore;
use crate::types::ScheduledJobDef;

struct CacheEntry {
    def: ScheduledJobDef,
    cron: CronExpr,
}

pub struct Scheduler<Q: QueueStore, S: ScheduledJobStore, C: Clock> {
    queue: Arc<Q>,
    store: Arc<S>,
    clock: C,
    cache: Mutex<HashMap<String, CacheEntry>>,
    loop_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl<Q: QueueStore + 'static, S: ScheduledJobStore + 'static, C: Clock + 'static> Scheduler<Q, S, C> {
    pub fn new(queue: Arc<Q>, store: Arc<S>, clock: C) -> Self {
        Self {
            queue,
            store,
            clock,
            cache: Mutex::new(HashMap::new()),
            loop_handle: AsyncMutex::new(None),
        }
    }

    /// Reloads every enabled job definition from the store and reparses
    /// its schedule string. A job whose schedule fails to parse is
    /// logged and dropped from the cache rather than aborting the whole
    /// reload — one bad entry must not block every other trigger.
    pub async fn refresh(&self) -> Result<(), ScheduleError> {
        let defs = self.store.list_enabled().await?;
        let mut cache = HashMap::with_capacity(defs.len());
        for def in defs {
            match parse_friendly(&def.schedule) {
                Ok(cron) => {
                    cache.insert(def.id.clone(), CacheEntry { def, cron });
                }
                Err(err) => {
                    tracing::warn!(job_id = %def.id, schedule = %def.schedule, error = %err, "dropping scheduled job with unparseable schedule");
                }
            }
        }
        *self.cache.lock() = cache;
        Ok(())
    }

    /// Registers or updates a single job at runtime without a full
    /// reload (spec.md §4.3: "entries may be added, removed, updated at
    /// runtime").
    pub async fn register_job(&self, def: ScheduledJobDef) -> Result<(), ScheduleError> {
        let cron = parse_friendly(&def.schedule)?;
        self.store.upsert(def.clone()).await?;
        if def.enabled {
            self.cache.lock().insert(def.id.clone(), CacheEntry { def, cron });
        } else {
            self.cache.lock().remove(&def.id);
        }
        Ok(())
    }

    pub async fn remove_job(&self, id: &str) -> Result<(), ScheduleError> {
        self.store.remove(id).await?;
        self.cache.lock().remove(id);
        Ok(())
    }

    /// Checks every cached job against the current time and fires those
    /// whose cron matches, returning the ids that fired. Exposed
    /// directly (rather than only through the background loop) so tests
    /// can drive it deterministically off a [`fj_core::FakeClock`].
    pub async fn tick(&self) -> Vec<String> {
        let now = self.clock.now();
        let due: Vec<ScheduledJobDef> = self
            .cache
            .lock()
            .values()
            .filter(|entry| entry.cron.matches(now))
            .map(|entry| entry.def.clone())
            .collect();

        let mut fired = Vec::with_capacity(due.len());
        for def in due {
            if let Err(err) = self.fire(&def).await {
                tracing::error!(job_id = %def.id, error = %err, "failed to fire scheduled job");
                continue;
            }
            fired.push(def.id);
        }
        fired
    }

    async fn fire(&self, def: &ScheduledJobDef) -> Result<(), ScheduleError> {
        let now = self.clock.now();
        self.store.update_last_run(&def.id, now).await?;

        let departure_from = now.date_naive() + ChronoDuration::days(def.route.departure_offset_days);
        let departure_to = departure_from + ChronoDuration::days(def.route.window_days);
        let request = BulkSearchRequest {
            bulk_search_id: String::new(),
            origins: def.route.origins.clone(),
            destinations: def.route.destinations.clone(),
            departure_from,
            departure_to,
            return_from: None,
            return_to: None,
            trip_length_days: def.route.trip_length_days,
            trip_type: def.route.trip_type,
            cabin: def.route.cabin,
            stops: def.route.stops,
            travelers: def.route.travelers,
            currency: def.route.currency.clone(),
            excluded_airlines: def.route.excluded_airlines.clone(),
        };
        let payload = serde_json::to_vec(&request).map_err(|err| {
            ScheduleError::InvalidSchedule(format!("failed to serialize bulk_search payload: {err}"))
        })?;

        self.queue
            .enqueue(QueueName::BulkSearch, payload, EnqueueMeta::for_actor("scheduler"))
            .await
            .map_err(|err| ScheduleError::InvalidSchedule(format!("enqueue failed: {err}")))?;
        Ok(())
    }

    /// Spawns the background minute-granularity tick loop. Called by
    /// `fj-manager` only once this process becomes leader.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(err) = this.refresh().await {
                tracing::error!(error = %err, "initial scheduler refresh failed");
            }
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                ticker.tick().await;
                this.tick().await;
            }
        });
        if let Ok(mut guard) = self.loop_handle.try_lock() {
            *guard = Some(handle);
        }
    }

    /// Stops the background loop. Called by `fj-manager` on leadership
    /// loss or shutdown.
    pub async fn stop(&self) {
        if let Some(handle) = self.loop_handle.lock().await.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
