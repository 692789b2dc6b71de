// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Type-erased facade over `fj_scheduler::Scheduler<Q, S, C>` so the
//! Manager does not need to carry the scheduler's store/clock generic
//! parameters of its own.

use async_trait::async_trait;
use fj_core::Clock;
use fj_queue::QueueStore;
use fj_scheduler::{Scheduler, ScheduledJobStore};
use std::sync::Arc;

#[async_trait]
pub trait SchedulerControl: Send + Sync {
    fn start(&self);
    async fn stop(&self);
}

#[async_trait]
impl<Q, S, C> SchedulerControl for Arc<Scheduler<Q, S, C>>
where
    Q: QueueStore + 'static,
    S: ScheduledJobStore + 'static,
    C: Clock + 'static,
{
    fn start(&self) {
        Scheduler::start(self)
    }

    async fn stop(&self) {
        Scheduler::stop(self).await
    }
}
