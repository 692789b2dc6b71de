// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classifies a persisted price against its route's baseline (spec.md
//! §3, "RouteBaseline ... deal detection requires baseline sample count
//! >= threshold"). The exact discount thresholds are deliberately
//! configurable rather than hard-coded — the spec calls out
//! "deal-classification thresholds beyond the contract the core
//! invokes" as an external, tunable concern; only the shape of the
//! contract (minimum sample count, a discount percentage, `DetectedDeal`
//! construction) lives in the core.

use chrono::{NaiveDate, Utc};
use fj_core::is_safe_price;
use fj_resultstore::{DetectedDeal, RouteBaseline};
use serde::Serialize;

/// Tunable classification parameters. Defaults are conservative: a
/// route needs at least 20 historical samples before its baseline is
/// trusted, and a fare must undercut the mean by 15% to count as a
/// deal.
#[derive(Debug, Clone, Copy)]
pub struct DealThresholds {
    pub min_sample_count: u32,
    pub min_discount_pct: f64,
}

impl Default for DealThresholds {
    fn default() -> Self {
        Self {
            min_sample_count: 20,
            min_discount_pct: 15.0,
        }
    }
}

/// Result of comparing a price against a route baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DealClassification {
    /// Baseline has too few samples to classify against.
    InsufficientBaseline { sample_count: u32 },
    /// Price is not meaningfully below baseline.
    NotADeal,
    /// Price undercuts the baseline mean by at least `min_discount_pct`.
    Deal(DetectedDeal),
}

/// Classifies `price` for `(origin, destination)` on `departure_date`
/// against `baseline`, per `thresholds`. Never panics on a non-finite or
/// unsafe price — callers are expected to have already filtered those
/// out via [`fj_core::is_safe_price`], but classification degrades to
/// `NotADeal` rather than misclassifying garbage input as a deal.
pub fn classify_price(
    origin: &str,
    destination: &str,
    departure_date: NaiveDate,
    price: f64,
    baseline: &RouteBaseline,
    thresholds: DealThresholds,
) -> DealClassification {
    if baseline.sample_count < thresholds.min_sample_count {
        return DealClassification::InsufficientBaseline {
            sample_count: baseline.sample_count,
        };
    }
    if !is_safe_price(price) || baseline.mean <= 0.0 {
        return DealClassification::NotADeal;
    }
    let discount_pct = (baseline.mean - price) / baseline.mean * 100.0;
    if discount_pct < thresholds.min_discount_pct {
        return DealClassification::NotADeal;
    }
    DealClassification::Deal(DetectedDeal {
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_date,
        price,
        baseline_mean: baseline.mean,
        discount_pct,
        detected_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(sample_count: u32, mean: f64) -> RouteBaseline {
        RouteBaseline {
            sample_count,
            mean,
            median: mean,
            stddev: 0.0,
            p10: mean,
            p25: mean,
            p75: mean,
            p90: mean,
            min: mean,
            max: mean,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn too_few_samples_is_insufficient() {
        let result = classify_price("JFK", "LAX", date(), 200.0, &baseline(5, 300.0), DealThresholds::default());
        assert_eq!(result, DealClassification::InsufficientBaseline { sample_count: 5 });
    }

    #[test]
    fn price_above_threshold_discount_is_not_a_deal() {
        let result = classify_price("JFK", "LAX", date(), 290.0, &baseline(30, 300.0), DealThresholds::default());
        assert_eq!(result, DealClassification::NotADeal);
    }

    #[test]
    fn price_undercutting_mean_is_a_deal() {
        let result = classify_price("JFK", "LAX", date(), 200.0, &baseline(30, 300.0), DealThresholds::default());
        match result {
            DealClassification::Deal(deal) => {
                assert!((deal.discount_pct - 33.333333333333336).abs() < 1e-9);
                assert_eq!(deal.baseline_mean, 300.0);
            }
            other => panic!("expected a deal, got {other:?}"),
        }
    }

    #[test]
    fn unsafe_price_never_classifies_as_a_deal() {
        let result = classify_price("JFK", "LAX", date(), -50.0, &baseline(30, 300.0), DealThresholds::default());
        assert_eq!(result, DealClassification::NotADeal);
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let thresholds = DealThresholds {
            min_sample_count: 2,
            min_discount_pct: 5.0,
        };
        let result = classify_price("JFK", "LAX", date(), 290.0, &baseline(2, 300.0), thresholds);
        assert!(matches!(result, DealClassification::Deal(_)));
    }
}
