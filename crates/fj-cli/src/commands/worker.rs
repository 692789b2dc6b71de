// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj worker ...` — `WorkerRegistry` discovery (spec.md §6).

use std::time::Duration;

use clap::{Args, Subcommand};
use fj_registry::WorkerRegistry;

use crate::backends::Backends;
use crate::output::{emit, OutputFormat, Table};

#[derive(Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
    /// Registry namespace to query
    #[arg(long, global = true, default_value = "fj")]
    pub namespace: String,
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// List workers that have heartbeat within the max-age window
    List {
        #[arg(long, default_value_t = 60)]
        max_age_secs: u64,
    },
    /// Show a single worker's heartbeat
    Show { worker_id: String },
    /// Remove a worker's heartbeat record
    Remove { worker_id: String },
}

pub async fn run(args: WorkerArgs, backends: &Backends, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        WorkerCommand::List { max_age_secs } => {
            let workers = backends
                .registry
                .list_live_workers(&args.namespace, Duration::from_secs(max_age_secs))
                .await?;
            emit(format, &workers, |workers| {
                let mut table = Table::new(vec!["id", "status", "current_job", "processed", "last_heartbeat"]);
                for w in workers {
                    table.push_row(vec![
                        w.id.clone(),
                        w.status.as_str().to_string(),
                        w.current_job.clone().unwrap_or_else(|| "-".to_string()),
                        w.processed_jobs.to_string(),
                        w.last_heartbeat.to_rfc3339(),
                    ]);
                }
                table.print();
            })?;
        }
        WorkerCommand::Show { worker_id } => {
            let worker = backends.registry.get_worker(&args.namespace, &worker_id).await?;
            emit(format, &worker, |worker| match worker {
                Some(w) => {
                    println!("id:          {}", w.id);
                    println!("hostname:    {}", w.hostname);
                    println!("status:      {}", w.status.as_str());
                    println!("current_job: {}", w.current_job.as_deref().unwrap_or("-"));
                    println!("processed:   {}", w.processed_jobs);
                    println!("concurrency: {}", w.concurrency);
                    println!("started_at:  {}", w.started_at.to_rfc3339());
                }
                None => println!("no such worker: {worker_id}"),
            })?;
        }
        WorkerCommand::Remove { worker_id } => {
            backends.registry.remove(&args.namespace, &worker_id).await?;
            println!("removed {worker_id}");
        }
    }
    Ok(())
}
