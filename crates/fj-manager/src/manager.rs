// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Manager: owns the worker pool's polling loops, the optional
//! leader-gated scheduler, and the backpressure gate that holds
//! `price_graph_sweep`/`continuous_price_graph` work off the queues
//! while bulk-search traffic is outstanding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fj_core::job::QueueName;
use fj_core::{Clock, Config};
use fj_queue::QueueStore;
use fj_registry::WorkerRegistry;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use crate::error::ManagerError;
use crate::handler::JobHandlers;
use crate::leader::LeaderElection;
use crate::scheduler_control::SchedulerControl;
use crate::worker_state::WorkerSlot;

/// Cache window for `bulk_search_busy`: the underlying stats call hits
/// the queue store twice (one per bulk queue), so a loop that polls
/// every few hundred milliseconds re-checks at most a few times a
/// second instead of on every tick.
const BULK_BUSY_CACHE_TTL: Duration = Duration::from_secs(2);

/// How often a worker with no cancel to watch still re-checks
/// `is_canceled` on a job it is actively running.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(500);

struct BulkBusyCache {
    checked_at: Option<std::time::Instant>,
    busy: bool,
}

pub struct Manager<Q: QueueStore + 'static, Reg: WorkerRegistry + 'static, C: Clock + 'static> {
    queue: Arc<Q>,
    registry: Arc<Reg>,
    clock: Arc<C>,
    config: Config,
    handlers: Arc<JobHandlers>,
    leader: Option<Arc<dyn LeaderElection>>,
    scheduler: Arc<dyn SchedulerControl>,
    slots: Vec<Arc<WorkerSlot>>,
    bulk_busy: SyncMutex<BulkBusyCache>,
    stopped: AtomicBool,
    worker_handles: AsyncMutex<Vec<JoinHandle<()>>>,
    heartbeat_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl<Q: QueueStore + 'static, Reg: WorkerRegistry + 'static, C: Clock + 'static> Manager<Q, Reg, C> {
    /// `leader` is `None` when this process always runs the scheduler
    /// unconditionally (single-process deployments); `Some` wires the
    /// scheduler's start/stop to the election's become-leader/lose-
    /// leader callbacks instead (spec.md §4.2/§4.4).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<Q>,
        registry: Arc<Reg>,
        clock: Arc<C>,
        config: Config,
        handlers: Arc<JobHandlers>,
        leader: Option<Arc<dyn LeaderElection>>,
        scheduler: Arc<dyn SchedulerControl>,
    ) -> Self {
        let slots = (0..config.concurrency.max(1))
            .map(|i| Arc::new(WorkerSlot::new(&config.worker_id, i, &hostname())))
            .collect();
        Self {
            queue,
            registry,
            clock,
            config,
            handlers,
            leader,
            scheduler,
            slots,
            bulk_busy: SyncMutex::new(BulkBusyCache {
                checked_at: None,
                busy: false,
            }),
            stopped: AtomicBool::new(true),
            worker_handles: AsyncMutex::new(Vec::new()),
            heartbeat_handle: AsyncMutex::new(None),
        }
    }

    /// Startup sequence (spec.md §4.4): allocate worker slots (done in
    /// `new`), start the registry heartbeat loop, spawn one polling
    /// loop per slot, then either start the scheduler unconditionally
    /// or hand its start/stop to leader election.
    pub async fn start(self: &Arc<Self>) -> Result<(), ManagerError> {
        if !self.stopped.swap(false, Ordering::SeqCst) {
            return Err(ManagerError::AlreadyStarted);
        }

        let heartbeat_handle = tokio::spawn({
            let this = Arc::clone(self);
            async move { this.heartbeat_loop().await }
        });
        *self.heartbeat_handle.lock().await = Some(heartbeat_handle);

        let mut handles = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let this = Arc::clone(self);
            let slot = Arc::clone(slot);
            handles.push(tokio::spawn(async move { this.worker_loop(slot).await }));
        }
        *self.worker_handles.lock().await = handles;

        match &self.leader {
            Some(leader) => leader.start(),
            None => self.scheduler.start(),
        }

        Ok(())
    }

    /// Graceful shutdown (spec.md §4.4): stop admitting new jobs,
    /// leave in-flight jobs until `shutdown_timeout` then abort, stop
    /// the scheduler/election, and mark every slot `stopping` in its
    /// final heartbeat.
    pub async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        for slot in &self.slots {
            slot.set_stopping();
        }

        let deadline = tokio::time::sleep(self.config.shutdown_timeout());
        tokio::pin!(deadline);
        let mut handles = self.worker_handles.lock().await;
        for handle in handles.drain(..) {
            tokio::select! {
                _ = handle => {}
                _ = &mut deadline => {
                    tracing::warn!("shutdown timeout elapsed with a worker loop still running");
                }
            }
        }

        if let Some(handle) = self.heartbeat_handle.lock().await.take() {
            handle.abort();
        }

        match &self.leader {
            Some(leader) => leader.stop().await,
            None => self.scheduler.stop().await,
        }
    }

    pub fn is_leader(&self) -> bool {
        match &self.leader {
            Some(leader) => leader.is_leader(),
            None => true,
        }
    }

    /// Whether `bulk_search`/`bulk_search_route` has outstanding
    /// (pending or processing) work, cached for
    /// [`BULK_BUSY_CACHE_TTL`].
    pub async fn bulk_search_busy(&self) -> Result<bool, ManagerError> {
        {
            let cache = self.bulk_busy.lock();
            if let Some(checked_at) = cache.checked_at {
                if checked_at.elapsed() < BULK_BUSY_CACHE_TTL {
                    return Ok(cache.busy);
                }
            }
        }

        let bulk_search = self.queue.get_queue_stats(QueueName::BulkSearch).await?;
        let bulk_search_route = self
            .queue
            .get_queue_stats(QueueName::BulkSearchRoute)
            .await?;
        let busy = bulk_search.is_busy() || bulk_search_route.is_busy();

        let mut cache = self.bulk_busy.lock();
        cache.checked_at = Some(std::time::Instant::now());
        cache.busy = busy;
        Ok(busy)
    }

    async fn heartbeat_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.heartbeat_interval());
        loop {
            interval.tick().await;
            if self.stopped.load(Ordering::SeqCst) {
                return;
            }
            for slot in &self.slots {
                let heartbeat = slot.snapshot();
                if let Err(err) = self
                    .registry
                    .publish_heartbeat(&self.config.registry_namespace, &heartbeat, self.config.heartbeat_ttl())
                    .await
                {
                    tracing::warn!(worker_id = slot.id(), error = %err, "failed to publish heartbeat");
                }
            }
        }
    }

    /// One worker's polling loop: walks `QueueName::PRIORITY_ORDER`
    /// every pass, dequeuing the first non-empty, non-gated queue it
    /// finds. Falls back to a short sleep when nothing is available so
    /// an idle worker does not spin.
    async fn worker_loop(self: Arc<Self>, slot: Arc<WorkerSlot>) {
        slot.set_active();
        while !self.stopped.load(Ordering::SeqCst) {
            let mut dequeued_any = false;
            for queue in QueueName::PRIORITY_ORDER {
                if self.stopped.load(Ordering::SeqCst) {
                    break;
                }
                if queue.gated_by_bulk_backpressure() {
                    match self.bulk_search_busy().await {
                        Ok(true) => continue,
                        Ok(false) => {}
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to check bulk-search backpressure");
                            continue;
                        }
                    }
                }
                match self.try_queue(&slot, queue).await {
                    Ok(true) => {
                        dequeued_any = true;
                        break;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        tracing::error!(queue = %queue, error = %err, "worker loop error");
                    }
                }
            }
            if !dequeued_any {
                tokio::time::sleep(self.config.queue_block_timeout()).await;
            }
        }
        slot.set_stopping();
    }

    /// Dequeues and runs (at most) one job from `queue`. Returns
    /// `Ok(true)` if a job was claimed (regardless of its outcome),
    /// `Ok(false)` if the queue was empty.
    async fn try_queue(&self, slot: &Arc<WorkerSlot>, queue: QueueName) -> Result<bool, ManagerError> {
        let job = match self.queue.dequeue(queue, self.config.queue_block_timeout()).await? {
            Some(job) => job,
            None => return Ok(false),
        };

        if self.queue.is_canceled(&job.id).await? {
            self.queue.ack(queue, &job.id).await?;
            return Ok(true);
        }

        slot.set_processing(job.id.as_str());
        let handler = Arc::clone(self.handlers.for_queue(queue));
        let job_timeout = self.config.job_timeout();

        let outcome = tokio::select! {
            result = handler.handle(&job) => Outcome::Finished(result),
            () = self.watch_for_cancel(&job.id) => Outcome::Canceled,
            () = tokio::time::sleep(job_timeout) => Outcome::TimedOut,
        };

        match outcome {
            Outcome::Finished(Ok(())) => {
                self.queue.ack(queue, &job.id).await?;
                slot.record_completed();
            }
            Outcome::Finished(Err(err)) => {
                tracing::warn!(job_id = %job.id, queue = %queue, error = %err, "job handler failed");
                if err.is_transient() {
                    self.queue
                        .nack(queue, &job.id, self.config.dead_letter_max_attempts)
                        .await?;
                } else {
                    self.queue.ack(queue, &job.id).await?;
                }
                slot.record_completed();
                slot.set_error();
            }
            Outcome::Canceled => {
                tracing::info!(job_id = %job.id, queue = %queue, "job canceled mid-flight");
                self.queue.ack(queue, &job.id).await?;
                slot.record_completed();
            }
            Outcome::TimedOut => {
                tracing::warn!(job_id = %job.id, queue = %queue, "job timed out");
                self.queue
                    .nack(queue, &job.id, self.config.dead_letter_max_attempts)
                    .await?;
                slot.record_completed();
                slot.set_error();
            }
        }

        Ok(true)
    }

    async fn watch_for_cancel(&self, job_id: &fj_core::job::JobId) {
        loop {
            tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
            match self.queue.is_canceled(job_id).await {
                Ok(true) => return,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(job_id = %job_id, error = %err, "failed to poll cancel flag");
                }
            }
        }
    }

    /// Exposed for operator introspection (`fj-cli`): the clock this
    /// manager was constructed with, so callers needing "now" for
    /// display use the same notion of time as the manager's internals.
    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }
}

enum Outcome {
    Finished(Result<(), crate::handler::HandlerError>),
    Canceled,
    TimedOut,
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "worker".to_string())
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
