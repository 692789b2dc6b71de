// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj bulk ...` — `BulkSearchRecord` inspection (spec.md §3).

use clap::{Args, Subcommand};
use fj_resultstore::ResultStore;

use crate::backends::Backends;
use crate::output::{emit, OutputFormat};

#[derive(Args)]
pub struct BulkArgs {
    #[command(subcommand)]
    pub command: BulkCommand,
}

#[derive(Subcommand)]
pub enum BulkCommand {
    /// Show a bulk-search record's progress and aggregate stats
    Show { id: String },
}

pub async fn run(command: BulkCommand, backends: &Backends, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        BulkCommand::Show { id } => {
            let record = backends.store.get_bulk_search(&id).await?;
            emit(format, &record, |r| {
                println!("id:        {}", r.id);
                println!("status:    {:?}", r.status);
                println!("completed: {}/{}", r.completed, r.total_searches);
                println!("currency:  {}", r.currency);
                println!(
                    "price:     min={:?} max={:?} avg={:?}",
                    r.stats.min_price, r.stats.max_price, r.stats.avg_price
                );
                println!("errors:    {}", r.stats.error_count);
                println!("offers:    {}", r.stats.total_offers);
            })?;
        }
    }
    Ok(())
}
