// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj sweep ...` — `ContinuousSweepProgress` + the out-of-band
//! `continuous_sweep:control` kill-switch (spec.md §4.7/§6). No admin
//! RPC exists to reach into the running `ContinuousSweep` instance, so
//! `pause`/`resume`/`stop` only flip the kill-switch the leader process
//! polls; `status` reports both the DB progress row and the kill-switch
//! side by side.

use clap::{Args, Subcommand};
use fj_queue::QueueStore;
use fj_resultstore::ResultStore;
use serde::Serialize;

use crate::backends::Backends;
use crate::output::{emit, OutputFormat};

#[derive(Args)]
pub struct SweepArgs {
    #[command(subcommand)]
    pub command: SweepCommand,
}

#[derive(Subcommand)]
pub enum SweepCommand {
    /// Show persisted progress plus the kill-switch state
    Status,
    /// Flip the kill-switch to paused
    Pause,
    /// Flip the kill-switch to resumed
    Resume,
    /// Flip the kill-switch to stopped (is_running=false)
    Stop,
}

#[derive(Serialize)]
struct SweepStatus {
    progress: Option<fj_resultstore::ContinuousSweepProgress>,
    control: fj_queue::ContinuousSweepControlFlags,
}

pub async fn run(command: SweepCommand, backends: &Backends, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        SweepCommand::Status => {
            let progress = backends.store.get_continuous_sweep_progress().await?;
            let control = backends.queue.get_continuous_sweep_control_flags().await?;
            let status = SweepStatus { progress, control };
            emit(format, &status, |s| {
                match &s.progress {
                    Some(p) => {
                        println!("sweep_number:      {}", p.sweep_number);
                        println!("route_index:       {}/{}", p.route_index, p.total_routes);
                        println!("queries_completed: {}", p.queries_completed);
                        println!("error_count:       {}", p.error_count);
                        println!("is_running:        {}", p.is_running);
                        println!("is_paused:         {}", p.is_paused);
                    }
                    None => println!("no sweep progress persisted yet"),
                }
                println!(
                    "control:           is_running={} is_paused={}",
                    s.control.is_running, s.control.is_paused
                );
            })?;
        }
        SweepCommand::Pause => {
            backends.queue.set_continuous_sweep_control_flags(None, Some(true)).await?;
            println!("paused");
        }
        SweepCommand::Resume => {
            backends
                .queue
                .set_continuous_sweep_control_flags(None, Some(false))
                .await?;
            println!("resumed");
        }
        SweepCommand::Stop => {
            backends
                .queue
                .set_continuous_sweep_control_flags(Some(false), None)
                .await?;
            println!("stopped");
        }
    }
    Ok(())
}
