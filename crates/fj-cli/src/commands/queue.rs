// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj queue ...` — direct `QueueStore` inspection (spec.md §4.1).

use std::str::FromStr;

use clap::{Args, Subcommand, ValueEnum};
use fj_core::job::QueueName;
use fj_queue::{JobListState, QueueStore};

use crate::backends::Backends;
use crate::output::{emit, OutputFormat, Table};

fn parse_queue(s: &str) -> Result<QueueName, String> {
    QueueName::from_str(s).map_err(|_| format!("unrecognized queue {s:?} (expected one of the closed queue set)"))
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StateArg {
    Pending,
    Processing,
    Dead,
}

impl From<StateArg> for JobListState {
    fn from(s: StateArg) -> Self {
        match s {
            StateArg::Pending => JobListState::Pending,
            StateArg::Processing => JobListState::Processing,
            StateArg::Dead => JobListState::Dead,
        }
    }
}

#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Show pending/processing/failed counts for a queue
    Stats {
        #[arg(value_parser = parse_queue)]
        queue: QueueName,
    },
    /// Show the oldest pending jobs in a queue
    Backlog {
        #[arg(value_parser = parse_queue)]
        queue: QueueName,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// List jobs in a given state
    List {
        #[arg(value_parser = parse_queue)]
        queue: QueueName,
        #[arg(value_enum)]
        state: StateArg,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Set the cluster-visible cancel flag for a job
    Cancel {
        job_id: String,
    },
    /// Per-actor enqueue counts over a trailing window
    Metrics {
        #[arg(value_parser = parse_queue)]
        queue: QueueName,
        #[arg(long, default_value_t = 60)]
        window_minutes: u32,
    },
}

pub async fn run(command: QueueCommand, backends: &Backends, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        QueueCommand::Stats { queue } => {
            let stats = backends.queue.get_queue_stats(queue).await?;
            emit(format, &stats, |s| {
                println!("pending:    {}", s.pending);
                println!("processing: {}", s.processing);
                println!("failed:     {}", s.failed);
            })?;
        }
        QueueCommand::Backlog { queue, limit } => {
            let jobs = backends.queue.get_backlog(queue, limit).await?;
            emit(format, &jobs, |jobs| {
                let mut table = Table::new(vec!["id", "type", "attempts", "enqueued_at"]);
                for job in jobs {
                    table.push_row(vec![
                        job.id.to_string(),
                        job.job_type.as_str().to_string(),
                        job.attempts.to_string(),
                        job.enqueued_at.to_rfc3339(),
                    ]);
                }
                table.print();
            })?;
        }
        QueueCommand::List {
            queue,
            state,
            limit,
            offset,
        } => {
            let jobs = backends.queue.list_jobs(queue, state.into(), limit, offset).await?;
            emit(format, &jobs, |jobs| {
                let mut table = Table::new(vec!["id", "type", "actor", "attempts"]);
                for job in jobs {
                    table.push_row(vec![
                        job.id.to_string(),
                        job.job_type.as_str().to_string(),
                        job.meta.actor.clone(),
                        job.attempts.to_string(),
                    ]);
                }
                table.print();
            })?;
        }
        QueueCommand::Cancel { job_id } => {
            backends.queue.cancel(&fj_core::job::JobId::new(job_id.clone())).await?;
            println!("canceled {job_id}");
        }
        QueueCommand::Metrics { queue, window_minutes } => {
            let metrics = backends.queue.get_enqueue_metrics(queue, window_minutes).await?;
            emit(format, &metrics, |m| {
                let mut table = Table::new(vec!["actor", "count"]);
                let mut pairs: Vec<_> = m.iter().collect();
                pairs.sort_by_key(|(actor, _)| actor.to_string());
                for (actor, count) in pairs {
                    table.push_row(vec![actor.clone(), count.to_string()]);
                }
                table.print();
            })?;
        }
    }
    Ok(())
}
