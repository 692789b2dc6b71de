// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job envelope and the closed set of queue names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id! {
    /// Opaque identifier assigned by the queue store on enqueue.
    pub struct JobId;
}

/// The six job types the core recognizes. Each maps onto exactly one
/// [`QueueName`] except `scheduled_job`, which is metadata carried on the
/// `scheduled_jobs` queue describing a recurring trigger rather than a
/// unit of work in its own right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FlightSearch,
    BulkSearch,
    BulkSearchRoute,
    PriceGraphSweep,
    ContinuousPriceGraph,
    ScheduledJob,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FlightSearch => "flight_search",
            JobType::BulkSearch => "bulk_search",
            JobType::BulkSearchRoute => "bulk_search_route",
            JobType::PriceGraphSweep => "price_graph_sweep",
            JobType::ContinuousPriceGraph => "continuous_price_graph",
            JobType::ScheduledJob => "scheduled_job",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed set of queues the worker pool multiplexes over, in the
/// priority order described by spec.md §3: `flight_search` beats
/// `bulk_search` beats `bulk_search_route` beats (only when bulk work is
/// idle) `price_graph_sweep` beats `continuous_price_graph`.
/// `scheduled_jobs` is not polled by workers — it is consulted by the
/// scheduler on leader start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueName {
    FlightSearch,
    BulkSearch,
    BulkSearchRoute,
    PriceGraphSweep,
    ContinuousPriceGraph,
    ScheduledJobs,
}

impl QueueName {
    /// All queues a worker dequeues from, already ordered by priority
    /// (highest first). `ScheduledJobs` is intentionally excluded: it is
    /// not a work queue, it is the scheduler's persisted trigger list.
    pub const PRIORITY_ORDER: [QueueName; 5] = [
        QueueName::FlightSearch,
        QueueName::BulkSearch,
        QueueName::BulkSearchRoute,
        QueueName::PriceGraphSweep,
        QueueName::ContinuousPriceGraph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::FlightSearch => "flight_search",
            QueueName::BulkSearch => "bulk_search",
            QueueName::BulkSearchRoute => "bulk_search_route",
            QueueName::PriceGraphSweep => "price_graph_sweep",
            QueueName::ContinuousPriceGraph => "continuous_price_graph",
            QueueName::ScheduledJobs => "scheduled_jobs",
        }
    }

    /// Whether this queue only moves when the bulk-search queues
    /// (`bulk_search`, `bulk_search_route`) have no outstanding work.
    /// See `Manager::bulk_search_busy` in `fj-manager`.
    pub fn gated_by_bulk_backpressure(&self) -> bool {
        matches!(
            self,
            QueueName::PriceGraphSweep | QueueName::ContinuousPriceGraph
        )
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseQueueNameError;

impl fmt::Display for ParseQueueNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized queue name")
    }
}

impl std::error::Error for ParseQueueNameError {}

impl FromStr for QueueName {
    type Err = ParseQueueNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flight_search" => Ok(QueueName::FlightSearch),
            "bulk_search" => Ok(QueueName::BulkSearch),
            "bulk_search_route" => Ok(QueueName::BulkSearchRoute),
            "price_graph_sweep" => Ok(QueueName::PriceGraphSweep),
            "continuous_price_graph" => Ok(QueueName::ContinuousPriceGraph),
            "scheduled_jobs" => Ok(QueueName::ScheduledJobs),
            _ => Err(ParseQueueNameError),
        }
    }
}

/// Enqueue-time provenance, carried alongside the payload and retrievable
/// later for `getEnqueueMetrics`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnqueueMeta {
    pub actor: String,
    pub request_id: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub remote_ip: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EnqueueMeta {
    pub fn for_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            ..Default::default()
        }
    }
}

/// Terminal/non-terminal status a dequeued job can be observed in.
/// This mirrors the lifecycle in spec.md §3: enqueued -> pending ->
/// in-processing -> acked | nacked | canceled. `Pending` and
/// `InProcessing` are transient states tracked by the queue store, not
/// carried on the `Job` struct itself (the struct in hand is always
/// either freshly dequeued or about to be enqueued).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProcessing,
    Acked,
    Nacked,
    Canceled,
}

/// A claimed unit of work, as handed to a worker by `dequeue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub queue: QueueName,
    pub job_type: JobType,
    pub payload: Vec<u8>,
    pub meta: EnqueueMeta,
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    /// Deserialize the payload as JSON into `T`. Payloads are always
    /// opaque bytes at the queue layer; every handler crate knows its
    /// own payload shape.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
