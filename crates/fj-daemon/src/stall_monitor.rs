// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic queue-health sampler feeding the operational notifier
//! (spec.md §7): a queue whose dead-letter count grows fires
//! `NotifyKind::ErrorSpike`; a queue whose `processing` count is
//! nonzero and unchanged across two consecutive samples fires
//! `NotifyKind::Stall`. Detection lives here, at the binary boundary —
//! `fj-queue`/`fj-manager` expose the raw stats, nothing more.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fj_adapters::{NotifyEvent, NotifyKind, Notifier};
use fj_core::job::QueueName;
use fj_queue::QueueStore;

pub struct StallMonitor<Q: QueueStore, N: Notifier> {
    queue: Arc<Q>,
    notifier: Arc<N>,
    interval: Duration,
}

impl<Q: QueueStore + 'static, N: Notifier + 'static> StallMonitor<Q, N> {
    pub fn new(queue: Arc<Q>, notifier: Arc<N>, interval: Duration) -> Self {
        Self {
            queue,
            notifier,
            interval,
        }
    }

    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut last_processing: HashMap<&'static str, u64> = HashMap::new();
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                for queue in QueueName::PRIORITY_ORDER {
                    let stats = match self.queue.get_queue_stats(queue).await {
                        Ok(stats) => stats,
                        Err(err) => {
                            tracing::warn!(queue = queue.as_str(), %err, "failed to read queue stats");
                            continue;
                        }
                    };

                    if stats.failed > 0 {
                        self.notifier
                            .notify(NotifyEvent {
                                kind: NotifyKind::ErrorSpike,
                                subject: queue.as_str().to_string(),
                                message: format!(
                                    "{} dead-lettered job(s) on {}",
                                    stats.failed,
                                    queue.as_str()
                                ),
                            })
                            .await;
                    }

                    let previous = last_processing.insert(queue.as_str(), stats.processing);
                    if let Some(previous) = previous {
                        if previous > 0 && previous == stats.processing {
                            self.notifier
                                .notify(NotifyEvent {
                                    kind: NotifyKind::Stall,
                                    subject: queue.as_str().to_string(),
                                    message: format!(
                                        "{} processing count unchanged at {} across a monitor interval",
                                        queue.as_str(),
                                        stats.processing
                                    ),
                                })
                                .await;
                        }
                    }
                }
            }
        })
    }
}
