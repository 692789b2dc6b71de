// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flight-price harvester daemon (`fjd`).
//!
//! Owns the worker pool, leader election, scheduler, and continuous
//! sweep for one process in the fleet. Construction order follows
//! SPEC_FULL.md §9: `QueueStore` → `WorkerRegistry` → `LeaderElector`
//! → `Scheduler` → handler crates → `Manager` (see `lifecycle::startup`).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod handlers;
mod lifecycle;
mod provider_adapter;
mod stall_monitor;

use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fj_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let config: Config = envy::from_env().map_err(|err| anyhow::anyhow!("invalid configuration: {err}"))?;

    info!(
        concurrency = config.concurrency,
        worker_id = %config.worker_id,
        "starting fj-daemon"
    );

    let runtime = lifecycle::startup(&config).await?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    runtime.shutdown().await;
    info!("fj-daemon stopped");
    Ok(())
}
