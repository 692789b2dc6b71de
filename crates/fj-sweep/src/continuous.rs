// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContinuousSweep`: the long-lived, pausable route-iteration state
//! machine owned by the leader process (spec.md §4.7).

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration as ChronoDuration;
use fj_core::job::{EnqueueMeta, Job, JobId};
use fj_core::{CabinClass, Clock, StopsPreference};
use fj_provider::{FlightsProvider, ProviderOptions};
use fj_queue::{QueueName, QueueStore};
use fj_resultstore::{
    ContinuousSweepConfigSnapshot, ContinuousSweepProgress, ContinuousSweepStats, PacingMode, ResultStore,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;

use crate::error::SweepError;
use crate::price_graph_sweep::process_tuple;

/// Departure window a continuously-emitted tuple searches. Not part of
/// the persisted config snapshot (spec.md §3 lists only pacing-related
/// fields there) — a fixed rolling window is the simplest thing that
/// keeps every emitted job's query shape identical across sweeps.
const CONTINUOUS_SWEEP_WINDOW_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub origin: String,
    pub destination: String,
}

/// Query parameters held constant across every tuple a sweep emits.
/// Distinct from `ContinuousSweepConfigSnapshot` because these aren't
/// part of the persisted pacing state (spec.md §3) — they're supplied
/// by whoever wires up the sweep.
#[derive(Debug, Clone)]
pub struct ContinuousSweepQueryDefaults {
    pub cabin: CabinClass,
    pub stops: StopsPreference,
    pub travelers: u32,
    pub currency: String,
    pub excluded_airlines: HashSet<String>,
}

impl Default for ContinuousSweepQueryDefaults {
    fn default() -> Self {
        Self {
            cabin: CabinClass::Economy,
            stops: StopsPreference::Any,
            travelers: 1,
            currency: "USD".to_string(),
            excluded_airlines: HashSet::new(),
        }
    }
}

/// Payload carried by a `continuous_price_graph` job: one
/// (origin, destination, trip-length) tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousPriceGraphPayload {
    pub origin: String,
    pub destination: String,
    pub trip_length_days: u32,
    pub departure_from: chrono::NaiveDate,
    pub departure_to: chrono::NaiveDate,
    pub cabin: CabinClass,
    pub stops: StopsPreference,
    pub travelers: u32,
    pub currency: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ContinuousSweepSnapshot {
    pub state: SweepState,
}

struct Inner {
    state: SweepState,
    config: ContinuousSweepConfigSnapshot,
}

pub struct ContinuousSweep<Q: QueueStore, R: ResultStore, C: Clock> {
    queue: Arc<Q>,
    store: Arc<R>,
    clock: C,
    routes: Vec<Route>,
    defaults: ContinuousSweepQueryDefaults,
    inner: RwLock<Inner>,
    progress: Mutex<ContinuousSweepProgress>,
    resume: Notify,
    loop_handle: AsyncMutex<Option<JoinHandle<()>>>,
    monitor_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl<Q: QueueStore + 'static, R: ResultStore + 'static, C: Clock + 'static> ContinuousSweep<Q, R, C> {
    /// Loads persisted progress (if any), resetting it when the
    /// `international_only` flag in the restored config snapshot
    /// disagrees with `config.international_only` (spec.md §4.7
    /// "Progress persistence").
    pub async fn new(
        queue: Arc<Q>,
        store: Arc<R>,
        clock: C,
        routes: Vec<Route>,
        config: ContinuousSweepConfigSnapshot,
        defaults: ContinuousSweepQueryDefaults,
    ) -> Result<Self, SweepError> {
        let restored = store.get_continuous_sweep_progress().await?;
        let progress = match restored {
            Some(existing) if existing.config.international_only == config.international_only => {
                ContinuousSweepProgress {
                    total_routes: routes.len(),
                    config: config.clone(),
                    ..existing
                }
            }
            Some(_) => {
                tracing::info!("international_only changed, resetting continuous sweep progress");
                ContinuousSweepProgress::new(routes.len(), config.clone())
            }
            None => ContinuousSweepProgress::new(routes.len(), config.clone()),
        };

        Ok(Self {
            queue,
            store,
            clock,
            routes,
            defaults,
            inner: RwLock::new(Inner {
                state: SweepState::Stopped,
                config,
            }),
            progress: Mutex::new(progress),
            resume: Notify::new(),
            loop_handle: AsyncMutex::new(None),
            monitor_handle: AsyncMutex::new(None),
        })
    }

    pub fn snapshot(&self) -> ContinuousSweepSnapshot {
        ContinuousSweepSnapshot {
            state: self.inner.read().state,
        }
    }

    pub fn progress(&self) -> ContinuousSweepProgress {
        self.progress.lock().clone()
    }

    /// `stopped -> running` (spec.md §4.7). No-op if already running.
    pub fn start(self: &Arc<Self>) {
        {
            let mut inner = self.inner.write();
            if inner.state == SweepState::Running {
                return;
            }
            inner.state = SweepState::Running;
        }
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_loop().await });
        if let Ok(mut guard) = self.loop_handle.try_lock() {
            *guard = Some(handle);
        }
    }

    /// `running -> stopped` / `paused -> stopped`.
    pub async fn stop(&self) {
        self.inner.write().state = SweepState::Stopped;
        self.resume.notify_waiters();
        if let Some(handle) = self.loop_handle.lock().await.take() {
            handle.abort();
        }
    }

    pub fn pause(&self) {
        let mut inner = self.inner.write();
        if inner.state == SweepState::Running {
            inner.state = SweepState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut inner = self.inner.write();
        if inner.state == SweepState::Paused {
            inner.state = SweepState::Running;
        }
        drop(inner);
        self.resume.notify_waiters();
    }

    /// Flips paused=true and spawns a monitor that flips it back once
    /// `queue_name`'s pending+processing backlog drains to zero
    /// (spec.md §4.7 "Auto-resume-after-queue-drain"). Exactly one
    /// monitor per sweep: a concurrent call while one is already
    /// running no-ops.
    pub fn pause_and_auto_resume_after_queue_drain(self: &Arc<Self>, queue_name: QueueName) {
        self.pause();
        let Ok(mut guard) = self.monitor_handle.try_lock() else {
            return;
        };
        if guard.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let this = Arc::clone(self);
        *guard = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(StdDuration::from_secs(5)).await;
                let stats = match this.queue.get_queue_stats(queue_name).await {
                    Ok(stats) => stats,
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to poll queue stats for auto-resume monitor");
                        continue;
                    }
                };
                if !stats.is_busy() {
                    this.resume();
                    return;
                }
            }
        }));
    }

    fn calculate_delay(&self, config: &ContinuousSweepConfigSnapshot) -> StdDuration {
        match config.pacing_mode {
            PacingMode::Fixed => StdDuration::from_millis(config.min_delay_ms),
            PacingMode::Adaptive => {
                let denom = (self.routes.len().max(1) * config.trip_lengths_days.len().max(1)) as f64;
                let target_ms = config.target_duration_hours * 3600.0 * 1000.0 / denom;
                StdDuration::from_millis(target_ms.max(config.min_delay_ms as f64) as u64)
            }
        }
    }

    async fn emit_price_graph_jobs(&self, route: &Route) -> Result<(), SweepError> {
        let today = self.clock.now().date_naive();
        let departure_to = today + ChronoDuration::days(CONTINUOUS_SWEEP_WINDOW_DAYS);
        let config = self.inner.read().config.clone();
        for trip_length in &config.trip_lengths_days {
            let payload = ContinuousPriceGraphPayload {
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                trip_length_days: *trip_length,
                departure_from: today,
                departure_to,
                cabin: self.defaults.cabin,
                stops: self.defaults.stops,
                travelers: self.defaults.travelers,
                currency: self.defaults.currency.clone(),
                excluded_airlines: self.defaults.excluded_airlines.clone(),
            };
            let bytes = serde_json::to_vec(&payload)
                .map_err(|err| SweepError::Validation(format!("failed to serialize continuous tuple: {err}")))?;
            self.queue
                .enqueue(
                    QueueName::ContinuousPriceGraph,
                    bytes,
                    EnqueueMeta::for_actor("continuous_sweep"),
                )
                .await?;
        }
        Ok(())
    }

    /// `complete_sweep()` (spec.md §4.7): records stats for the sweep
    /// that just finished, then rolls the counters over for the next
    /// one.
    async fn complete_sweep(&self) -> Result<(), SweepError> {
        let finished = {
            let mut progress = self.progress.lock();
            let finished = progress.clone();
            progress.sweep_number += 1;
            progress.route_index = 0;
            progress.queries_completed = 0;
            progress.error_count = 0;
            progress.last_error = None;
            progress.sweep_started_at = self.clock.now();
            finished
        };
        let duration_secs = (self.clock.now() - finished.sweep_started_at).num_milliseconds() as f64 / 1000.0;
        let avg_delay_ms = if finished.queries_completed > 0 {
            duration_secs * 1000.0 / finished.queries_completed as f64
        } else {
            0.0
        };
        self.store
            .record_continuous_sweep_stats(ContinuousSweepStats {
                sweep_number: finished.sweep_number,
                duration_secs,
                queries_completed: finished.queries_completed,
                error_count: finished.error_count,
                avg_delay_ms,
                observed_min_price: None,
                observed_max_price: None,
                finished_at: self.clock.now(),
            })
            .await?;
        self.persist_progress().await
    }

    async fn persist_progress(&self) -> Result<(), SweepError> {
        let snapshot = self.progress.lock().clone();
        self.store.save_continuous_sweep_progress(snapshot).await?;
        Ok(())
    }

    async fn bulk_search_busy(&self) -> bool {
        for queue in [QueueName::BulkSearch, QueueName::BulkSearchRoute] {
            match self.queue.get_queue_stats(queue).await {
                Ok(stats) if stats.is_busy() => return true,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read queue stats for bulk-search backpressure check");
                }
            }
        }
        false
    }

    /// Main loop (spec.md §4.7). Runs until `stop()` flips the state to
    /// `Stopped`; `abort()` on the join handle is the hard kill switch
    /// used when the process is shutting down mid-sleep.
    async fn run_loop(self: Arc<Self>) {
        let mut last_saved_at = self.clock.now();
        loop {
            if self.inner.read().state == SweepState::Stopped {
                return;
            }
            if self.inner.read().state == SweepState::Paused {
                self.resume.notified().await;
                continue;
            }
            if self.bulk_search_busy().await {
                tokio::time::sleep(StdDuration::from_millis(100)).await;
                continue;
            }

            let route = {
                let progress = self.progress.lock();
                if progress.route_index >= progress.total_routes {
                    None
                } else {
                    self.routes.get(progress.route_index).cloned()
                }
            };
            let Some(route) = route else {
                if let Err(err) = self.complete_sweep().await {
                    tracing::error!(error = %err, "failed to finalize completed sweep");
                }
                continue;
            };

            if let Err(err) = self.emit_price_graph_jobs(&route).await {
                tracing::error!(origin = %route.origin, destination = %route.destination, error = %err, "failed to emit continuous price-graph jobs");
                let mut progress = self.progress.lock();
                progress.error_count += 1;
                progress.last_error = Some(err.to_string());
            }

            let (should_save, config) = {
                let mut progress = self.progress.lock();
                progress.route_index += 1;
                progress.queries_completed += 1;
                let now = self.clock.now();
                let due_by_time = (now - last_saved_at).num_minutes() >= 5;
                let due_by_count = progress.queries_completed % 100 == 0;
                if due_by_time || due_by_count {
                    last_saved_at = now;
                }
                (due_by_time || due_by_count, self.inner.read().config.clone())
            };
            if should_save {
                if let Err(err) = self.persist_progress().await {
                    tracing::error!(error = %err, "failed to persist continuous sweep progress");
                }
            }

            tokio::time::sleep(self.calculate_delay(&config)).await;
        }
    }
}

/// Handler for dequeued `continuous_price_graph` jobs. Honors both
/// kill switches described in spec.md §4.7: the Redis fallback flag and
/// the DB progress row's `is_running`.
pub struct ContinuousPriceGraphWorker<P: FlightsProvider, R: ResultStore, Q: QueueStore> {
    provider: Arc<P>,
    store: Arc<R>,
    queue: Arc<Q>,
}

impl<P: FlightsProvider, R: ResultStore, Q: QueueStore> ContinuousPriceGraphWorker<P, R, Q> {
    pub fn new(provider: Arc<P>, store: Arc<R>, queue: Arc<Q>) -> Self {
        Self { provider, store, queue }
    }

    pub async fn handle_job(&self, job: &Job) -> Result<(), SweepError> {
        let flags = self.queue.get_continuous_sweep_control_flags().await?;
        if !flags.is_running {
            tracing::debug!(job_id = %job.id, "continuous sweep control flag disabled, acking without processing");
            return Ok(());
        }
        if let Some(progress) = self.store.get_continuous_sweep_progress().await? {
            if !progress.is_running {
                tracing::debug!(job_id = %job.id, "continuous sweep progress row disabled, acking without processing");
                return Ok(());
            }
        }

        let payload: ContinuousPriceGraphPayload = job
            .payload_as()
            .map_err(|err| SweepError::Validation(format!("invalid continuous_price_graph payload: {err}")))?;
        let options = ProviderOptions {
            travelers: payload.travelers,
            currency: payload.currency.clone(),
            stops: payload.stops,
            cabin: payload.cabin,
            trip_type: fj_core::TripType::RoundTrip,
            language: "en".to_string(),
            excluded_airlines: payload.excluded_airlines.clone(),
        };
        let (_inserted, errored) = process_tuple(
            self.provider.as_ref(),
            self.store.as_ref(),
            &payload.origin,
            &payload.destination,
            payload.trip_length_days,
            payload.departure_from,
            payload.departure_to,
            payload.travelers,
            &payload.currency,
            &options,
        )
        .await;
        if errored > 0 {
            tracing::warn!(job_id = %job.id, origin = %payload.origin, destination = %payload.destination, "continuous price-graph tuple recorded errors");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "continuous_tests.rs"]
mod tests;
