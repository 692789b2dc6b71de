// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dials the same Redis/Postgres backends `fj-daemon` runs against.
//! No admin RPC protocol is in scope for this system (spec.md §1), so
//! `fj` talks to `QueueStore`/`WorkerRegistry`/`ResultStore`/
//! `ScheduledJobStore` directly rather than through a daemon socket —
//! see DESIGN.md's "Open Questions resolved" for this departure from
//! the teacher's client/daemon split.

use std::sync::Arc;

use fj_core::Config;
use fj_queue::RedisQueueStore;
use fj_registry::RedisWorkerRegistry;
use fj_resultstore::PostgresResultStore;
use fj_scheduler::PostgresScheduledJobStore;
use sqlx::postgres::PgPoolOptions;

pub struct Backends {
    pub queue: Arc<RedisQueueStore>,
    pub registry: Arc<RedisWorkerRegistry>,
    pub store: Arc<PostgresResultStore>,
    pub scheduled: Arc<PostgresScheduledJobStore>,
}

pub async fn connect(config: &Config) -> anyhow::Result<Backends> {
    let queue = Arc::new(RedisQueueStore::new(&config.redis_url, config.queue_stream_prefix.clone())?);
    let registry = Arc::new(RedisWorkerRegistry::new(&config.redis_url)?);
    let pool = PgPoolOptions::new().max_connections(4).connect(&config.database_url).await?;
    let store = Arc::new(PostgresResultStore::new(pool.clone()));
    let scheduled = Arc::new(PostgresScheduledJobStore::new(pool));
    Ok(Backends {
        queue,
        registry,
        store,
        scheduled,
    })
}
