// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process startup/shutdown (spec.md §9 "dependency-injection wiring").
//! Construction order: `QueueStore` → `WorkerRegistry` → `LeaderElector`
//! → `Scheduler` → the handler crates → `Manager`. Each collaborator is
//! built against its Redis/Postgres-backed production implementation;
//! only the `FlightsProvider` is an adapter this binary owns, since the
//! real scraper is out of scope.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use fj_adapters::{LogNotifier, RateLimitedNotifier};
use fj_bulk::{BulkCoordinator, FlightSearchWorker, RouteWorker};
use fj_core::{Config, SystemClock, UuidIdGen};
use fj_election::{instance_id, LeaderElector, RedisLockBackend};
use fj_manager::{JobHandler, JobHandlers, LeaderElection, Manager, SchedulerControl};
use fj_queue::{QueueStore, RedisQueueStore};
use fj_registry::RedisWorkerRegistry;
use fj_resultstore::{ContinuousSweepConfigSnapshot, PostgresResultStore};
use fj_scheduler::{PostgresScheduledJobStore, Scheduler};
use fj_sweep::{ContinuousPriceGraphWorker, ContinuousSweep, ContinuousSweepQueryDefaults, PriceGraphSweep, Route};
use thiserror::Error;

use crate::handlers::{
    BulkCoordinatorHandler, ContinuousPriceGraphHandler, FlightSearchHandler, PriceGraphSweepHandler,
    RouteWorkerHandler,
};
use crate::provider_adapter::HttpFlightsProvider;
use crate::stall_monitor::StallMonitor;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("queue store error: {0}")]
    Queue(#[from] fj_queue::QueueError),
    #[error("worker registry error: {0}")]
    Registry(#[from] fj_registry::RegistryError),
    #[error("result store error: {0}")]
    Store(#[from] fj_resultstore::StoreError),
    #[error("scheduled job store error: {0}")]
    Schedule(#[from] fj_scheduler::ScheduleError),
    #[error("sweep error: {0}")]
    Sweep(#[from] fj_sweep::SweepError),
    #[error("flights provider error: {0}")]
    Provider(#[from] fj_provider::ProviderError),
    #[error("database connection error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("manager error: {0}")]
    Manager(#[from] fj_manager::ManagerError),
    #[error("failed to read route universe file {path}: {source}")]
    RoutesFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse route universe file {path}: {source}")]
    RoutesParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

type Queue = RedisQueueStore;
type Registry = RedisWorkerRegistry;
type Store = PostgresResultStore;
type Provider = HttpFlightsProvider;

/// Everything a running process needs to keep alive until shutdown.
pub struct Runtime {
    pub manager: Arc<Manager<Queue, Registry, SystemClock>>,
    pub continuous_sweep: Arc<ContinuousSweep<Queue, Store, SystemClock>>,
    monitor_handle: tokio::task::JoinHandle<()>,
}

impl Runtime {
    pub async fn shutdown(self) {
        self.manager.stop().await;
        self.continuous_sweep.stop().await;
        self.monitor_handle.abort();
    }
}

fn load_routes(path: &str) -> Result<Vec<Route>, LifecycleError> {
    #[derive(serde::Deserialize)]
    struct RouteEntry {
        origin: String,
        destination: String,
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            let entries: Vec<RouteEntry> =
                serde_json::from_str(&contents).map_err(|source| LifecycleError::RoutesParse {
                    path: path.to_string(),
                    source,
                })?;
            Ok(entries
                .into_iter()
                .map(|e| Route {
                    origin: e.origin,
                    destination: e.destination,
                })
                .collect())
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path, "route universe file not found, continuous sweep starts with an empty route list");
            Ok(Vec::new())
        }
        Err(source) => Err(LifecycleError::RoutesFile {
            path: path.to_string(),
            source,
        }),
    }
}

pub async fn startup(config: &Config) -> Result<Runtime, LifecycleError> {
    let queue = Arc::new(RedisQueueStore::new(&config.redis_url, config.queue_stream_prefix.clone())?);
    let registry = Arc::new(RedisWorkerRegistry::new(&config.redis_url)?);

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.concurrency as u32 + 2)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PostgresResultStore::new(pg_pool.clone()));
    let scheduled_store = Arc::new(PostgresScheduledJobStore::new(pg_pool));

    let provider = Arc::new(HttpFlightsProvider::new(
        config.provider_base_url.clone(),
        config.provider_call_timeout(),
    )?);

    let clock = SystemClock;

    let scheduler = Arc::new(Scheduler::new(Arc::clone(&queue), Arc::clone(&scheduled_store), clock));

    let routes = load_routes(&config.continuous_sweep_routes_path)?;
    let sweep_config = ContinuousSweepConfigSnapshot {
        international_only: config.continuous_sweep_international_only,
        ..ContinuousSweepConfigSnapshot::default()
    };
    let continuous_sweep = Arc::new(
        ContinuousSweep::new(
            Arc::clone(&queue),
            Arc::clone(&store),
            clock,
            routes,
            sweep_config,
            ContinuousSweepQueryDefaults::default(),
        )
        .await?,
    );

    let lock_backend = Arc::new(RedisLockBackend::new(&config.redis_url)?);
    let leader_instance_id = instance_id(&hostname());
    let on_become_leader = {
        let scheduler = Arc::clone(&scheduler);
        let continuous_sweep = Arc::clone(&continuous_sweep);
        move || {
            tracing::info!("acquired leadership, starting scheduler and continuous sweep");
            scheduler.start();
            continuous_sweep.start();
        }
    };
    let on_lose_leader = {
        let scheduler = Arc::clone(&scheduler);
        let continuous_sweep = Arc::clone(&continuous_sweep);
        move || {
            tracing::info!("lost leadership, stopping scheduler and continuous sweep");
            let scheduler = Arc::clone(&scheduler);
            let continuous_sweep = Arc::clone(&continuous_sweep);
            tokio::spawn(async move {
                scheduler.stop().await;
                continuous_sweep.stop().await;
            });
        }
    };
    let leader_elector = Arc::new(LeaderElector::new(
        config.scheduler_lock_key.clone(),
        leader_instance_id,
        config.scheduler_lock_ttl(),
        lock_backend,
        on_become_leader,
        on_lose_leader,
    ));

    let handlers = Arc::new(build_handlers(config, &queue, &store, &provider));

    let manager = Arc::new(Manager::new(
        Arc::clone(&queue),
        registry,
        Arc::new(clock),
        config.clone(),
        handlers,
        Some(leader_elector as Arc<dyn LeaderElection>),
        scheduler as Arc<dyn SchedulerControl>,
    ));
    manager.start().await?;

    let notifier = Arc::new(RateLimitedNotifier::new(LogNotifier));
    let monitor_handle = StallMonitor::new(Arc::clone(&queue), notifier, config.heartbeat_interval()).spawn();

    Ok(Runtime {
        manager,
        continuous_sweep,
        monitor_handle,
    })
}

fn build_handlers(
    config: &Config,
    queue: &Arc<Queue>,
    store: &Arc<Store>,
    provider: &Arc<Provider>,
) -> JobHandlers {
    let id_gen: Arc<dyn fj_core::IdGen> = Arc::new(UuidIdGen);

    let flight_search_route_worker = RouteWorker::new(
        Arc::clone(provider),
        Arc::clone(store),
        config.top_n_deals,
        config.provider_call_timeout(),
    );
    let flight_search = FlightSearchWorker::new(flight_search_route_worker, Arc::clone(store), Arc::clone(&id_gen));

    let bulk_search_route_worker = RouteWorker::new(
        Arc::clone(provider),
        Arc::clone(store),
        config.top_n_deals,
        config.provider_call_timeout(),
    );

    JobHandlers {
        flight_search: Arc::new(FlightSearchHandler(flight_search)) as Arc<dyn JobHandler>,
        bulk_search: Arc::new(BulkCoordinatorHandler(BulkCoordinator::new(
            Arc::clone(queue),
            Arc::clone(store),
            id_gen,
        ))) as Arc<dyn JobHandler>,
        bulk_search_route: Arc::new(RouteWorkerHandler(bulk_search_route_worker)) as Arc<dyn JobHandler>,
        price_graph_sweep: Arc::new(PriceGraphSweepHandler(PriceGraphSweep::new(
            Arc::clone(provider),
            Arc::clone(store),
            Arc::clone(queue),
            config.price_graph_sweep_delay(),
        ))) as Arc<dyn JobHandler>,
        continuous_price_graph: Arc::new(ContinuousPriceGraphHandler(ContinuousPriceGraphWorker::new(
            Arc::clone(provider),
            Arc::clone(store),
            Arc::clone(queue),
        ))) as Arc<dyn JobHandler>,
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "fj-daemon".to_string())
}
