// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row/record shapes the core touches in the result store (spec.md §3,
//! §6). The relational/graph schema itself is out of scope; these types
//! are the contract the core depends on.

use chrono::{DateTime, NaiveDate, Utc};
pub use fj_core::TripType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `BulkSearchRecord.status` may only transition in this order — never
/// regress (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkSearchStatus {
    Queued,
    Coordinating,
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl BulkSearchStatus {
    fn rank(self) -> u8 {
        match self {
            BulkSearchStatus::Queued => 0,
            BulkSearchStatus::Coordinating => 1,
            BulkSearchStatus::Running => 2,
            BulkSearchStatus::Completed => 3,
            BulkSearchStatus::CompletedWithErrors => 3,
            BulkSearchStatus::Failed => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BulkSearchStatus::Completed
                | BulkSearchStatus::CompletedWithErrors
                | BulkSearchStatus::Failed
        )
    }

    /// Whether moving from `self` to `next` respects the non-regressing
    /// order in spec.md §3. Terminal statuses never transition further;
    /// `Failed` is reachable from any non-terminal state (a hard abort).
    pub fn can_transition_to(self, next: BulkSearchStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BulkSearchAggregateStats {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub error_count: u32,
    pub total_offers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSearchRecord {
    pub id: String,
    pub total_searches: u32,
    pub completed: u32,
    pub currency: String,
    pub status: BulkSearchStatus,
    pub stats: BulkSearchAggregateStats,
    pub created_at: DateTime<Utc>,
}

impl BulkSearchRecord {
    pub fn new(id: impl Into<String>, total_searches: u32, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_searches,
            completed: 0,
            currency: currency.into(),
            status: BulkSearchStatus::Queued,
            stats: BulkSearchAggregateStats::default(),
            created_at: Utc::now(),
        }
    }
}

/// Payload carried by a `bulk_search_route` job (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePayload {
    pub bulk_search_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_from: NaiveDate,
    pub departure_to: NaiveDate,
    pub return_from: Option<NaiveDate>,
    pub return_to: Option<NaiveDate>,
    pub trip_length_days: Option<u32>,
    pub trip_type: TripType,
    pub cabin: String,
    pub stops: String,
    pub travelers: u32,
    pub currency: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

/// A single persisted best offer for one route (spec.md §4.5 step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSearchOffer {
    pub bulk_search_id: String,
    pub origin: String,
    pub destination: String,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub price: f64,
    pub currency: String,
    pub airline_code: Option<String>,
    pub total_duration_minutes: u32,
    pub outbound_legs_json: serde_json::Value,
    pub return_legs_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Generic per-search result row referenced by `BulkSearchRecord`'s
/// aggregate stats (kept distinct from `BulkSearchOffer` because a
/// result can record "no offer found" with just an error).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSearchResult {
    pub bulk_search_id: String,
    pub origin: String,
    pub destination: String,
    pub price: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceGraphResult {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub trip_length_days: Option<u32>,
    pub price: f64,
    pub currency: String,
    pub distance_miles: Option<f64>,
    pub cost_per_mile: Option<f64>,
    pub travelers: u32,
    pub cabin: String,
    pub stops: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteBaseline {
    pub sample_count: u32,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedDeal {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub price: f64,
    pub baseline_mean: f64,
    pub discount_pct: f64,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    Fixed,
    Adaptive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousSweepConfigSnapshot {
    pub trip_lengths_days: Vec<u32>,
    pub pacing_mode: PacingMode,
    pub target_duration_hours: f64,
    pub min_delay_ms: u64,
    pub international_only: bool,
}

impl Default for ContinuousSweepConfigSnapshot {
    fn default() -> Self {
        Self {
            trip_lengths_days: vec![7],
            pacing_mode: PacingMode::Adaptive,
            target_duration_hours: 24.0,
            min_delay_ms: 750,
            international_only: false,
        }
    }
}

/// Singleton row (spec.md §3). `route_index` is the 0-based cursor into
/// the generated route list; it must always satisfy
/// `0 <= route_index <= total_routes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousSweepProgress {
    pub sweep_number: u64,
    pub route_index: usize,
    pub total_routes: usize,
    pub queries_completed: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
    pub sweep_started_at: DateTime<Utc>,
    pub config: ContinuousSweepConfigSnapshot,
    pub is_running: bool,
    pub is_paused: bool,
}

impl ContinuousSweepProgress {
    pub fn new(total_routes: usize, config: ContinuousSweepConfigSnapshot) -> Self {
        Self {
            sweep_number: 1,
            route_index: 0,
            total_routes,
            queries_completed: 0,
            error_count: 0,
            last_error: None,
            sweep_started_at: Utc::now(),
            config,
            is_running: true,
            is_paused: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousSweepStats {
    pub sweep_number: u64,
    pub duration_secs: f64,
    pub queries_completed: u64,
    pub error_count: u64,
    pub avg_delay_ms: f64,
    pub observed_min_price: Option<f64>,
    pub observed_max_price: Option<f64>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_never_regress() {
        assert!(BulkSearchStatus::Queued.can_transition_to(BulkSearchStatus::Coordinating));
        assert!(BulkSearchStatus::Coordinating.can_transition_to(BulkSearchStatus::Running));
        assert!(BulkSearchStatus::Running.can_transition_to(BulkSearchStatus::Completed));
        assert!(!BulkSearchStatus::Running.can_transition_to(BulkSearchStatus::Queued));
        assert!(!BulkSearchStatus::Completed.can_transition_to(BulkSearchStatus::Running));
    }

    #[test]
    fn failed_is_terminal_and_cannot_be_left() {
        assert!(BulkSearchStatus::Failed.is_terminal());
        assert!(!BulkSearchStatus::Failed.can_transition_to(BulkSearchStatus::Running));
    }

    #[test]
    fn same_status_transition_is_allowed_as_a_no_op() {
        assert!(BulkSearchStatus::Running.can_transition_to(BulkSearchStatus::Running));
    }
}
