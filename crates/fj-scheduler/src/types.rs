// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use fj_core::{CabinClass, StopsPreference, TripType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The route details a scheduled job fires a `bulk_search` with (spec.md
/// §4.3 step ii). Dates are expressed relative to fire time since a
/// recurring trigger can never carry an absolute departure window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledRouteSpec {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub departure_offset_days: i64,
    pub window_days: i64,
    pub trip_length_days: Option<u32>,
    pub trip_type: TripType,
    pub cabin: CabinClass,
    pub stops: StopsPreference,
    pub travelers: u32,
    pub currency: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

/// A persisted recurring trigger (spec.md §4.3). `schedule` is the
/// friendly grammar string; it is parsed into a [`crate::CronExpr`] on
/// load and whenever it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJobDef {
    pub id: String,
    pub name: String,
    pub schedule: String,
    pub enabled: bool,
    pub route: ScheduledRouteSpec,
    pub last_run: Option<DateTime<Utc>>,
}
