// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj schedule ...` — `ScheduledJobStore` management (spec.md §4.3).
//! Enable/disable is implemented as a read-modify-write through
//! `upsert`, since the store only exposes whole-record upserts.

use clap::{Args, Subcommand};
use fj_scheduler::{parse_friendly, ScheduledJobStore};

use crate::backends::Backends;
use crate::output::{emit, OutputFormat, Table};

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// List every enabled scheduled job
    List,
    /// Validate a friendly schedule string without persisting anything
    Check { schedule: String },
    /// Disable a scheduled job (it stops firing but is not deleted)
    Disable { id: String },
    /// Re-enable a previously disabled scheduled job
    Enable { id: String },
    /// Remove a scheduled job entirely
    Remove { id: String },
}

pub async fn run(command: ScheduleCommand, backends: &Backends, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        ScheduleCommand::List => {
            let jobs = backends.scheduled.list_enabled().await?;
            emit(format, &jobs, |jobs| {
                let mut table = Table::new(vec!["id", "name", "schedule", "last_run"]);
                for j in jobs {
                    table.push_row(vec![
                        j.id.clone(),
                        j.name.clone(),
                        j.schedule.clone(),
                        j.last_run.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string()),
                    ]);
                }
                table.print();
            })?;
        }
        ScheduleCommand::Check { schedule } => match parse_friendly(&schedule) {
            Ok(cron) => println!("{}", cron.to_cron_string()),
            Err(err) => {
                eprintln!("invalid schedule: {err}");
                std::process::exit(1);
            }
        },
        ScheduleCommand::Disable { id } => set_enabled(backends, &id, false).await?,
        ScheduleCommand::Enable { id } => set_enabled(backends, &id, true).await?,
        ScheduleCommand::Remove { id } => {
            backends.scheduled.remove(&id).await?;
            println!("removed {id}");
        }
    }
    Ok(())
}

async fn set_enabled(backends: &Backends, id: &str, enabled: bool) -> anyhow::Result<()> {
    let mut job = backends.scheduled.get(id).await?;
    job.enabled = enabled;
    backends.scheduled.upsert(job).await?;
    println!("{} {id}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
