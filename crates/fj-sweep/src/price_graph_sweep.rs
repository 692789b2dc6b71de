// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PriceGraphSweep`: handler for `price_graph_sweep` jobs (spec.md
//! §4.6). Runs an (origins x destinations x trip-lengths x cabins)
//! cross-product of price-graph calls, persisting one row per
//! returned date.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use fj_core::job::{Job, JobId};
use fj_core::{haversine_miles, is_safe_price, CabinClass, StopsPreference};
use fj_provider::{FlightsProvider, ProviderOptions};
use fj_queue::QueueStore;
use fj_resultstore::{PriceGraphResult, ResultStore};
use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Payload carried by a `price_graph_sweep` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceGraphSweepPayload {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub trip_lengths_days: Vec<u32>,
    pub cabins: Vec<CabinClass>,
    pub stops: StopsPreference,
    pub departure_from: NaiveDate,
    pub departure_to: NaiveDate,
    pub travelers: u32,
    pub currency: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

/// Outcome of a sweep run: how many rows were persisted vs how many
/// tuples errored. Drives the status a caller logs/records (spec.md
/// §4.6: `completed` | `completed_with_errors` | `failed`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub rows_inserted: u32,
    pub errors: u32,
    pub canceled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStatus {
    Completed,
    CompletedWithErrors,
    Failed,
}

impl SweepOutcome {
    pub fn status(&self) -> SweepStatus {
        if self.rows_inserted == 0 {
            SweepStatus::Failed
        } else if self.errors > 0 {
            SweepStatus::CompletedWithErrors
        } else {
            SweepStatus::Completed
        }
    }
}

pub struct PriceGraphSweep<P: FlightsProvider, R: ResultStore, Q: QueueStore> {
    provider: Arc<P>,
    store: Arc<R>,
    queue: Arc<Q>,
    per_call_delay: Duration,
}

impl<P: FlightsProvider, R: ResultStore, Q: QueueStore> PriceGraphSweep<P, R, Q> {
    pub fn new(provider: Arc<P>, store: Arc<R>, queue: Arc<Q>, per_call_delay: Duration) -> Self {
        Self {
            provider,
            store,
            queue,
            per_call_delay,
        }
    }

    pub async fn handle_job(&self, job: &Job) -> Result<SweepOutcome, SweepError> {
        let payload: PriceGraphSweepPayload = job
            .payload_as()
            .map_err(|err| SweepError::Validation(format!("invalid price_graph_sweep payload: {err}")))?;
        self.run(&job.id, payload).await
    }

    async fn run(&self, job_id: &JobId, payload: PriceGraphSweepPayload) -> Result<SweepOutcome, SweepError> {
        let mut outcome = SweepOutcome::default();
        for origin in &payload.origins {
            for destination in &payload.destinations {
                for trip_length in &payload.trip_lengths_days {
                    for cabin in &payload.cabins {
                        if self.queue.is_canceled(job_id).await? {
                            outcome.canceled = true;
                            return Ok(outcome);
                        }
                        let options = ProviderOptions {
                            travelers: payload.travelers,
                            currency: payload.currency.clone(),
                            stops: payload.stops,
                            cabin: *cabin,
                            trip_type: fj_core::TripType::RoundTrip,
                            language: "en".to_string(),
                            excluded_airlines: payload.excluded_airlines.clone(),
                        };
                        let (inserted, errored) = process_tuple(
                            &self.provider,
                            &self.store,
                            origin,
                            destination,
                            *trip_length,
                            payload.departure_from,
                            payload.departure_to,
                            payload.travelers,
                            &payload.currency,
                            &options,
                        )
                        .await;
                        outcome.rows_inserted += inserted;
                        outcome.errors += errored;
                        tokio::time::sleep(self.per_call_delay).await;
                    }
                }
            }
        }
        Ok(outcome)
    }
}

/// Shared core used by both the one-off sweep and
/// `ContinuousPriceGraphWorker`: one price-graph call plus one
/// `PriceGraphResult` insert per valid returned date. Invalid
/// (non-finite) or unpriced results are skipped without counting as
/// errors (spec.md §4.6); only a failed provider call or a failed
/// store write counts toward the error total.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn process_tuple<P: FlightsProvider, R: ResultStore>(
    provider: &P,
    store: &R,
    origin: &str,
    destination: &str,
    trip_length_days: u32,
    departure_from: NaiveDate,
    departure_to: NaiveDate,
    travelers: u32,
    currency: &str,
    options: &ProviderOptions,
) -> (u32, u32) {
    let points = match provider
        .get_price_graph(
            departure_from,
            departure_to,
            Some(trip_length_days),
            origin,
            destination,
            options,
        )
        .await
    {
        Ok(points) => points,
        Err(err) => {
            tracing::warn!(origin, destination, trip_length_days, error = %err, "price-graph sweep call failed");
            return (0, 1);
        }
    };

    let distance_miles = haversine_miles(origin, destination);
    let mut inserted = 0u32;
    let mut errored = 0u32;
    for point in points {
        if !point.price.is_finite() || !is_safe_price(point.price) {
            continue;
        }
        let cost_per_mile = distance_miles.and_then(|miles| {
            if miles > 0.0 {
                Some(point.price / miles)
            } else {
                None
            }
        });
        let result = PriceGraphResult {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: point.start_date,
            return_date: point.return_date,
            trip_length_days: Some(trip_length_days),
            price: point.price,
            currency: currency.to_string(),
            distance_miles,
            cost_per_mile,
            travelers,
            cabin: options.cabin.as_str().to_string(),
            stops: options.stops.as_str().to_string(),
        };
        match store.insert_price_graph_result(result).await {
            Ok(()) => inserted += 1,
            Err(err) => {
                tracing::warn!(origin, destination, error = %err, "failed to persist price-graph result");
                errored += 1;
            }
        }
    }
    (inserted, errored)
}

#[cfg(test)]
#[path = "price_graph_sweep_tests.rs"]
mod tests;
