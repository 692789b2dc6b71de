// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BulkCoordinator`: handler for `bulk_search` jobs (spec.md §4.5). Fans
//! one logical request into one `bulk_search_route` job per (origin,
//! destination) pair and owns the `BulkSearchRecord` those route workers
//! increment.

use std::sync::Arc;

use fj_core::id::IdGen;
use fj_core::job::{EnqueueMeta, Job, QueueName};
use fj_core::payloads::BulkSearchRequest;
use fj_queue::QueueStore;
use fj_resultstore::{BulkSearchRecord, BulkSearchStatus, ResultStore, RoutePayload};

use crate::error::BulkError;

pub struct BulkCoordinator<Q: QueueStore, R: ResultStore> {
    queue: Arc<Q>,
    store: Arc<R>,
    id_gen: Arc<dyn IdGen>,
}

impl<Q: QueueStore, R: ResultStore> BulkCoordinator<Q, R> {
    pub fn new(queue: Arc<Q>, store: Arc<R>, id_gen: Arc<dyn IdGen>) -> Self {
        Self { queue, store, id_gen }
    }

    /// Deserializes and coordinates a `bulk_search` job's payload,
    /// returning the (possibly freshly generated) `bulk_search_id`.
    pub async fn handle_job(&self, job: &Job) -> Result<String, BulkError> {
        let request: BulkSearchRequest = job
            .payload_as()
            .map_err(|err| BulkError::Validation(format!("invalid bulk_search payload: {err}")))?;
        self.coordinate(request).await
    }

    /// Core fan-out algorithm (spec.md §4.5 "Coordinator"). Validates
    /// inputs, creates the owning record, emits one route job per
    /// (origin, destination) pair, and patches `total_searches` down if
    /// some enqueues failed.
    pub async fn coordinate(&self, mut request: BulkSearchRequest) -> Result<String, BulkError> {
        if request.origins.is_empty() {
            return Err(BulkError::Validation("origins must not be empty".to_string()));
        }
        if request.destinations.is_empty() {
            return Err(BulkError::Validation(
                "destinations must not be empty".to_string(),
            ));
        }

        if request.bulk_search_id.is_empty() {
            request.bulk_search_id = self.id_gen.next();
        }
        let bulk_search_id = request.bulk_search_id.clone();

        let total_searches = (request.origins.len() * request.destinations.len()) as u32;
        self.store
            .create_bulk_search(BulkSearchRecord::new(
                bulk_search_id.clone(),
                total_searches,
                request.currency.clone(),
            ))
            .await?;
        self.store
            .update_bulk_search_status(&bulk_search_id, BulkSearchStatus::Coordinating)
            .await?;

        let mut enqueued = 0u32;
        for origin in &request.origins {
            for destination in &request.destinations {
                let payload = RoutePayload {
                    bulk_search_id: bulk_search_id.clone(),
                    origin: origin.clone(),
                    destination: destination.clone(),
                    departure_from: request.departure_from,
                    departure_to: request.departure_to,
                    return_from: request.return_from,
                    return_to: request.return_to,
                    trip_length_days: request.trip_length_days,
                    trip_type: request.trip_type,
                    cabin: request.cabin.as_str().to_string(),
                    stops: request.stops.as_str().to_string(),
                    travelers: request.travelers,
                    currency: request.currency.clone(),
                    excluded_airlines: request.excluded_airlines.clone(),
                };
                let bytes = match serde_json::to_vec(&payload) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        tracing::warn!(origin, destination, error = %err, "failed to serialize route payload");
                        continue;
                    }
                };
                match self
                    .queue
                    .enqueue(
                        QueueName::BulkSearchRoute,
                        bytes,
                        EnqueueMeta::for_actor("bulk_coordinator"),
                    )
                    .await
                {
                    Ok(_) => enqueued += 1,
                    Err(err) => {
                        tracing::warn!(origin, destination, error = %err, "failed to enqueue bulk_search_route job");
                    }
                }
            }
        }

        if enqueued == 0 {
            self.store
                .finalize_bulk_search(&bulk_search_id, BulkSearchStatus::Failed)
                .await?;
            return Err(BulkError::EmptyFanOut);
        }

        if enqueued != total_searches {
            self.store
                .update_bulk_search_total_searches(&bulk_search_id, enqueued)
                .await?;
            // Open question in spec.md §9: a route worker racing this
            // patch may have already driven `completed` up to the
            // revised total. Re-read and finalize if so — exactly one
            // of this path or the route worker's own finalize check
            // wins, since `finalize_bulk_search` only transitions a
            // non-terminal record once.
            let record = self.store.get_bulk_search(&bulk_search_id).await?;
            if record.completed >= enqueued {
                let status = if record.stats.error_count > 0 {
                    BulkSearchStatus::CompletedWithErrors
                } else {
                    BulkSearchStatus::Completed
                };
                self.store.finalize_bulk_search(&bulk_search_id, status).await?;
                return Ok(bulk_search_id);
            }
        }

        self.store
            .update_bulk_search_status(&bulk_search_id, BulkSearchStatus::Running)
            .await?;
        Ok(bulk_search_id)
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
