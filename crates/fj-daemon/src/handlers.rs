// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapts each handler crate's own `handle_job` and error enum into
//! `fj_manager::handler::JobHandler`/`HandlerError` (spec.md §4.0 "Error
//! handling"). `fj-manager` never depends on `fj-bulk`/`fj-sweep`
//! directly, so this thin wrapping only exists here, at the binary that
//! wires both together.

use async_trait::async_trait;
use fj_bulk::{BulkCoordinator, BulkError, FlightSearchWorker, RouteWorker};
use fj_core::job::Job;
use fj_manager::{HandlerError, JobHandler};
use fj_provider::FlightsProvider;
use fj_queue::QueueStore;
use fj_resultstore::ResultStore;
use fj_sweep::{ContinuousPriceGraphWorker, PriceGraphSweep, SweepError};

fn from_bulk_error(err: BulkError) -> HandlerError {
    if err.is_transient() {
        HandlerError::transient(err.to_string())
    } else {
        HandlerError::permanent(err.to_string())
    }
}

fn from_sweep_error(err: SweepError) -> HandlerError {
    if err.is_transient() {
        HandlerError::transient(err.to_string())
    } else {
        HandlerError::permanent(err.to_string())
    }
}

pub struct BulkCoordinatorHandler<Q: QueueStore + 'static, R: ResultStore + 'static>(
    pub BulkCoordinator<Q, R>,
);

#[async_trait]
impl<Q: QueueStore + 'static, R: ResultStore + 'static> JobHandler for BulkCoordinatorHandler<Q, R> {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        self.0.handle_job(job).await.map(|_| ()).map_err(from_bulk_error)
    }
}

pub struct RouteWorkerHandler<P: FlightsProvider + 'static, R: ResultStore + 'static>(
    pub RouteWorker<P, R>,
);

#[async_trait]
impl<P: FlightsProvider + 'static, R: ResultStore + 'static> JobHandler for RouteWorkerHandler<P, R> {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        self.0.handle_job(job).await.map_err(from_bulk_error)
    }
}

pub struct FlightSearchHandler<P: FlightsProvider + 'static, R: ResultStore + 'static>(
    pub FlightSearchWorker<P, R>,
);

#[async_trait]
impl<P: FlightsProvider + 'static, R: ResultStore + 'static> JobHandler for FlightSearchHandler<P, R> {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        self.0.handle_job(job).await.map_err(from_bulk_error)
    }
}

pub struct PriceGraphSweepHandler<
    P: FlightsProvider + 'static,
    R: ResultStore + 'static,
    Q: QueueStore + 'static,
>(pub PriceGraphSweep<P, R, Q>);

#[async_trait]
impl<P: FlightsProvider + 'static, R: ResultStore + 'static, Q: QueueStore + 'static> JobHandler
    for PriceGraphSweepHandler<P, R, Q>
{
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        self.0.handle_job(job).await.map(|_| ()).map_err(from_sweep_error)
    }
}

pub struct ContinuousPriceGraphHandler<
    P: FlightsProvider + 'static,
    R: ResultStore + 'static,
    Q: QueueStore + 'static,
>(pub ContinuousPriceGraphWorker<P, R, Q>);

#[async_trait]
impl<P: FlightsProvider + 'static, R: ResultStore + 'static, Q: QueueStore + 'static> JobHandler
    for ContinuousPriceGraphHandler<P, R, Q>
{
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        self.0.handle_job(job).await.map_err(from_sweep_error)
    }
}
