// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fj deals ...` — `DealDetector` classification against a route's
//! persisted baseline (spec.md §3 "RouteBaseline", §2 "DealDetector").
//! No job type fans out deal detection on its own; this is the
//! operator-driven entry point the spec leaves external.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use fj_deals::{classify_price, DealClassification, DealThresholds};
use fj_resultstore::ResultStore;

use crate::backends::Backends;
use crate::output::{emit, OutputFormat};

#[derive(Args)]
pub struct DealsArgs {
    #[command(subcommand)]
    pub command: DealsCommand,
}

#[derive(Subcommand)]
pub enum DealsCommand {
    /// Refresh a route's baseline from recent price history
    Refresh { origin: String, destination: String },
    /// Classify a price against a route's current baseline
    Check {
        origin: String,
        destination: String,
        departure_date: NaiveDate,
        price: f64,
        /// Minimum historical sample count before a baseline is trusted
        #[arg(long, default_value_t = DealThresholds::default().min_sample_count)]
        min_sample_count: u32,
        /// Minimum discount below the baseline mean to count as a deal
        #[arg(long, default_value_t = DealThresholds::default().min_discount_pct)]
        min_discount_pct: f64,
    },
}

pub async fn run(command: DealsCommand, backends: &Backends, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        DealsCommand::Refresh { origin, destination } => {
            let baseline = backends.store.refresh_route_baseline(&origin, &destination).await?;
            emit(format, &baseline, |b| {
                println!("sample_count: {}", b.sample_count);
                println!("mean:         {:.2}", b.mean);
                println!("median:       {:.2}", b.median);
                println!("stddev:       {:.2}", b.stddev);
                println!("p10/p25/p75/p90: {:.2}/{:.2}/{:.2}/{:.2}", b.p10, b.p25, b.p75, b.p90);
                println!("min/max:      {:.2}/{:.2}", b.min, b.max);
            })?;
        }
        DealsCommand::Check {
            origin,
            destination,
            departure_date,
            price,
            min_sample_count,
            min_discount_pct,
        } => {
            let baseline = backends.store.get_route_baseline(&origin, &destination).await?;
            let thresholds = DealThresholds {
                min_sample_count,
                min_discount_pct,
            };
            let classification = match baseline {
                Some(baseline) => classify_price(&origin, &destination, departure_date, price, &baseline, thresholds),
                None => DealClassification::InsufficientBaseline { sample_count: 0 },
            };
            emit(format, &classification, |c| match c {
                DealClassification::InsufficientBaseline { sample_count } => {
                    println!("insufficient baseline: only {sample_count} samples");
                }
                DealClassification::NotADeal => println!("not a deal"),
                DealClassification::Deal(deal) => {
                    println!(
                        "deal: {:.2} vs baseline mean {:.2} ({:.1}% off)",
                        deal.price, deal.baseline_mean, deal.discount_pct
                    );
                }
            })?;
        }
    }
    Ok(())
}
