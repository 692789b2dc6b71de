// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster-wide singleton lock with TTL renewal and become/lose-leader
//! callbacks (spec.md §4.2).
//!
//! ```text
//!   FOLLOWER ──acquire(SETNX,TTL)──▶ LEADER ──renew(CAS)──▶ LEADER
//!      ▲                                 │
//!      └──────────── lose(renew fails) ──┘
//! ```

use crate::backend::LockBackend;
use crate::error::ElectionError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// `instance_id` should be unique per process: `hostname + unique-nanos`
/// per spec.md §4.2.
pub fn instance_id(hostname: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{hostname}-{nanos}")
}

pub struct LeaderElector<B: LockBackend> {
    key: String,
    instance_id: String,
    ttl: Duration,
    renew_interval: Duration,
    backend: Arc<B>,
    is_leader: Arc<AtomicBool>,
    on_become_leader: Callback,
    on_lose_leader: Callback,
    loop_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

impl<B: LockBackend> LeaderElector<B> {
    pub fn new(
        key: impl Into<String>,
        instance_id: impl Into<String>,
        ttl: Duration,
        backend: Arc<B>,
        on_become_leader: impl Fn() + Send + Sync + 'static,
        on_lose_leader: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            instance_id: instance_id.into(),
            ttl,
            renew_interval: ttl / 3,
            backend,
            is_leader: Arc::new(AtomicBool::new(false)),
            on_become_leader: Arc::new(on_become_leader),
            on_lose_leader: Arc::new(on_lose_leader),
            loop_handle: AsyncMutex::new(None),
        }
    }

    pub fn instance_id_str(&self) -> &str {
        &self.instance_id
    }

    pub fn is_leader(&self) -> bool {
        self.is_leader.load(Ordering::SeqCst)
    }

    /// Attempts to become leader if currently a follower. Invokes
    /// `on_become_leader` exactly once on a FOLLOWER -> LEADER
    /// transition. A no-op (besides the backend call) if already leader.
    pub async fn acquire(&self) -> Result<bool, ElectionError> {
        if self.is_leader() {
            return Ok(true);
        }
        let acquired = self
            .backend
            .try_acquire(&self.key, &self.instance_id, self.ttl)
            .await?;
        if acquired {
            self.is_leader.store(true, Ordering::SeqCst);
            tracing::info!(instance_id = %self.instance_id, key = %self.key, "became leader");
            (self.on_become_leader)();
        }
        Ok(acquired)
    }

    /// Renews the lock if currently leader. Invokes `on_lose_leader`
    /// exactly once on a LEADER -> FOLLOWER transition (renewal failed
    /// because the key expired or was taken by another instance).
    pub async fn renew(&self) -> Result<bool, ElectionError> {
        if !self.is_leader() {
            return Ok(false);
        }
        let renewed = self
            .backend
            .renew(&self.key, &self.instance_id, self.ttl)
            .await?;
        if !renewed {
            self.is_leader.store(false, Ordering::SeqCst);
            tracing::warn!(instance_id = %self.instance_id, key = %self.key, "lost leadership");
            (self.on_lose_leader)();
        }
        Ok(renewed)
    }

    /// Releases the lock. Only called when stopping; always flips local
    /// state to follower regardless of whether the CAS-delete applied
    /// (if it didn't, we'd already lost the lock to someone else).
    pub async fn release(&self) -> Result<bool, ElectionError> {
        let was_leader = self.is_leader.swap(false, Ordering::SeqCst);
        let released = self.backend.release(&self.key, &self.instance_id).await?;
        if was_leader && !released {
            tracing::debug!("release found lock already held by another instance");
        }
        if was_leader {
            (self.on_lose_leader)();
        }
        Ok(released)
    }

    /// Spawns the background acquire/renew loop. Interval defaults to
    /// 1/3 of the TTL per spec.md §4.2.
    pub fn start(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.renew_interval);
            loop {
                ticker.tick().await;
                let result = if this.is_leader() {
                    this.renew().await
                } else {
                    this.acquire().await
                };
                if let Err(err) = result {
                    tracing::warn!(error = %err, "leader election tick failed");
                }
            }
        });
        // Best-effort: if start() is called twice, the prior loop is
        // dropped (and therefore aborted) in favor of the new one.
        if let Ok(mut guard) = self.loop_handle.try_lock() {
            *guard = Some(handle);
        }
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.loop_handle.lock().await.take() {
            handle.abort();
        }
        let _ = self.release().await;
    }
}

#[cfg(test)]
#[path = "elector_tests.rs"]
mod tests;
