// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Notifier`: the operational channel spec.md §7 names for stall,
//! error-spike, rate-limited, and sweep-lifecycle alerts. Delivery
//! itself (email/Slack/etc.) is explicitly out of scope (spec.md §1);
//! this crate only carries the contract the core calls into and the
//! "min 5 min between identical alerts" rate limit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// The four alert kinds spec.md §7 names. `route_or_sweep_id` is carried
/// on the event itself (rather than split per-kind) so a single
/// `RateLimitedNotifier` can key its cooldown window on `(kind, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    Stall,
    ErrorSpike,
    RateLimited,
    SweepLifecycle,
}

impl NotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyKind::Stall => "stall",
            NotifyKind::ErrorSpike => "error_spike",
            NotifyKind::RateLimited => "rate_limited",
            NotifyKind::SweepLifecycle => "sweep_lifecycle",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifyEvent {
    pub kind: NotifyKind,
    /// The route (`"<origin>-<destination>"`) or sweep identifier this
    /// alert concerns, used both for the message and as half of the
    /// rate-limit key.
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotifyEvent);
}

/// Writes every event as a `tracing::warn!`. The default (and, absent a
/// real delivery integration, only) notifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotifyEvent) {
        tracing::warn!(kind = event.kind.as_str(), subject = %event.subject, "{}", event.message);
    }
}

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Decorator enforcing "min 5 min between identical alerts" (spec.md
/// §7), keyed by `(kind, subject)`. Wraps any other `Notifier` — the
/// underlying delivery mechanism never sees a suppressed event.
pub struct RateLimitedNotifier<N: Notifier> {
    inner: N,
    cooldown: Duration,
    last_sent: Mutex<HashMap<(NotifyKind, String), DateTime<Utc>>>,
}

impl<N: Notifier> RateLimitedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self::with_cooldown(inner, DEFAULT_COOLDOWN)
    }

    pub fn with_cooldown(inner: N, cooldown: Duration) -> Self {
        Self {
            inner,
            cooldown,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    fn should_send(&self, key: &(NotifyKind, String)) -> bool {
        let now = Utc::now();
        let mut last_sent = self.last_sent.lock();
        match last_sent.get(key) {
            Some(last) if now.signed_duration_since(*last).to_std().unwrap_or(Duration::ZERO) < self.cooldown => {
                false
            }
            _ => {
                last_sent.insert(key.clone(), now);
                true
            }
        }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for RateLimitedNotifier<N> {
    async fn notify(&self, event: NotifyEvent) {
        let key = (event.kind, event.subject.clone());
        if !self.should_send(&key) {
            tracing::debug!(kind = event.kind.as_str(), subject = %event.subject, "alert suppressed by rate limit");
            return;
        }
        self.inner.notify(event).await;
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
