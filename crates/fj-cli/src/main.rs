// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj` — operator CLI for the flight-price harvester fleet.
//!
//! Talks directly to the `QueueStore`/`WorkerRegistry`/`ResultStore`/
//! `ScheduledJobStore` backends rather than through a daemon RPC
//! socket, since no admin API is in scope for this system (see
//! DESIGN.md's "Open Questions resolved" for why this departs from the
//! teacher's client/daemon split).

mod backends;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use fj_core::Config;

use commands::{bulk, deals, queue, schedule, sweep, worker};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "fj", version, about = "Operator CLI for the flight-price harvester fleet")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue inspection and control
    Queue(queue::QueueArgs),
    /// Worker registry inspection
    Worker(worker::WorkerArgs),
    /// Bulk-search record inspection
    Bulk(bulk::BulkArgs),
    /// Scheduled job management
    Schedule(schedule::ScheduleArgs),
    /// Continuous sweep status and kill-switch control
    Sweep(sweep::SweepArgs),
    /// Route baseline refresh and deal classification
    Deals(deals::DealsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config: Config = envy::from_env().map_err(|err| anyhow::anyhow!("invalid configuration: {err}"))?;
    let backends = backends::connect(&config).await?;

    match cli.command {
        Commands::Queue(args) => queue::run(args.command, &backends, cli.output).await,
        Commands::Worker(args) => worker::run(args, &backends, cli.output).await,
        Commands::Bulk(args) => bulk::run(args.command, &backends, cli.output).await,
        Commands::Schedule(args) => schedule::run(args.command, &backends, cli.output).await,
        Commands::Sweep(args) => sweep::run(args.command, &backends, cli.output).await,
        Commands::Deals(args) => deals::run(args.command, &backends, cli.output).await,
    }
}
