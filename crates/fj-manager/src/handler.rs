// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the Manager's worker loop and the per-queue
//! handler crates (`fj-bulk`, `fj-sweep`). The Manager itself never
//! depends on `fj-bulk`/`fj-sweep`/`fj-resultstore`/`fj-provider` — the
//! binary that wires everything up (`fj-daemon`) adapts each concrete
//! handler's `handle_job` into this trait, translating that handler's
//! own error enum via its `is_transient()` method (spec.md §4.0
//! "Error handling").

use async_trait::async_trait;
use fj_core::job::Job;
use std::fmt;
use std::sync::Arc;

/// Outcome of a failed `JobHandler::handle` call, already classified
/// for the Manager's nack/ack decision in `try(queue)` (spec.md §7):
/// `transient` jobs are nacked for redelivery, everything else is a
/// terminal failure (the job is acked and the error is logged/counted
/// by the handler itself, per the "error policy inside a route worker"
/// rule most handlers already follow).
#[derive(Debug, Clone)]
pub struct HandlerError {
    message: String,
    transient: bool,
}

impl HandlerError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {}

/// One queue's job handler, type-erased so the Manager can hold all
/// five in a single struct without depending on the handler crates'
/// concrete generic parameters.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError>;
}

/// The handler bound to each queue the worker loop multiplexes over
/// (spec.md §3 `QueueNames`, `ScheduledJobs` excluded since it is never
/// polled). Every field is required: a queue with no registered
/// handler would dequeue jobs the Manager can never finish, silently
/// leaking visibility-timeout redeliveries forever.
pub struct JobHandlers {
    pub flight_search: Arc<dyn JobHandler>,
    pub bulk_search: Arc<dyn JobHandler>,
    pub bulk_search_route: Arc<dyn JobHandler>,
    pub price_graph_sweep: Arc<dyn JobHandler>,
    pub continuous_price_graph: Arc<dyn JobHandler>,
}

impl JobHandlers {
    pub fn for_queue(&self, queue: fj_core::QueueName) -> &Arc<dyn JobHandler> {
        use fj_core::QueueName::*;
        match queue {
            FlightSearch => &self.flight_search,
            BulkSearch => &self.bulk_search,
            BulkSearchRoute => &self.bulk_search_route,
            PriceGraphSweep => &self.price_graph_sweep,
            ContinuousPriceGraph => &self.continuous_price_graph,
            ScheduledJobs => unreachable!("scheduled_jobs is never dequeued by a worker"),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex as AsyncMutex;

    /// Records every job it is asked to handle and returns a
    /// preprogrammed outcome (`Ok`, a transient error, or a permanent
    /// error) in sequence, cycling once exhausted.
    pub struct FakeJobHandler {
        outcomes: AsyncMutex<Vec<Result<(), HandlerError>>>,
        calls: AtomicUsize,
    }

    impl FakeJobHandler {
        pub fn always_ok() -> Arc<Self> {
            Self::with_outcomes(vec![Ok(())])
        }

        pub fn with_outcomes(outcomes: Vec<Result<(), HandlerError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: AsyncMutex::new(outcomes),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobHandler for FakeJobHandler {
        async fn handle(&self, _job: &Job) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcomes = self.outcomes.lock().await;
            if outcomes.is_empty() {
                return Ok(());
            }
            let idx = (self.calls.load(Ordering::SeqCst) - 1) % outcomes.len();
            outcomes[idx].clone()
        }
    }
}
