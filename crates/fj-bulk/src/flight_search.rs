// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FlightSearchWorker`: handler for `flight_search` jobs. A single-
//! route, single-date lookup enqueued directly rather than fanned out
//! by `BulkCoordinator`. Wraps itself in an ad-hoc one-route bulk
//! search record so the existing progress/finalize machinery in
//! `RouteWorker` applies unchanged.

use std::sync::Arc;

use fj_core::id::IdGen;
use fj_core::job::Job;
use fj_core::{FlightSearchRequest, TripType};
use fj_provider::FlightsProvider;
use fj_resultstore::{BulkSearchRecord, BulkSearchStatus, ResultStore, RoutePayload};

use crate::error::BulkError;
use crate::route_worker::RouteWorker;

pub struct FlightSearchWorker<P: FlightsProvider, R: ResultStore> {
    route_worker: RouteWorker<P, R>,
    store: Arc<R>,
    id_gen: Arc<dyn IdGen>,
}

impl<P: FlightsProvider, R: ResultStore> FlightSearchWorker<P, R> {
    pub fn new(route_worker: RouteWorker<P, R>, store: Arc<R>, id_gen: Arc<dyn IdGen>) -> Self {
        Self {
            route_worker,
            store,
            id_gen,
        }
    }

    pub async fn handle_job(&self, job: &Job) -> Result<(), BulkError> {
        let request: FlightSearchRequest = job
            .payload_as()
            .map_err(|err| BulkError::Validation(format!("invalid flight_search payload: {err}")))?;
        self.search(request).await
    }

    async fn search(&self, request: FlightSearchRequest) -> Result<(), BulkError> {
        let bulk_search_id = self.id_gen.next();
        self.store
            .create_bulk_search(BulkSearchRecord::new(bulk_search_id.clone(), 1, request.currency.clone()))
            .await?;
        self.store
            .update_bulk_search_status(&bulk_search_id, BulkSearchStatus::Running)
            .await?;

        let trip_length_days = match request.trip_type {
            TripType::RoundTrip => request
                .return_date
                .map(|return_date| (return_date - request.departure_date).num_days().max(0) as u32),
            TripType::OneWay => None,
        };

        let payload = RoutePayload {
            bulk_search_id,
            origin: request.origin,
            destination: request.destination,
            departure_from: request.departure_date,
            departure_to: request.departure_date,
            return_from: request.return_date,
            return_to: request.return_date,
            trip_length_days,
            trip_type: request.trip_type,
            cabin: request.cabin.as_str().to_string(),
            stops: request.stops.as_str().to_string(),
            travelers: request.travelers,
            currency: request.currency,
            excluded_airlines: request.excluded_airlines,
        };
        self.route_worker.process_route(payload).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "flight_search_tests.rs"]
mod tests;
