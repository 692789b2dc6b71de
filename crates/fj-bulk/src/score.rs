// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scoreDeal` (spec.md §4.5): a deterministic, lower-is-better score
//! used to pick the best itinerary among the top-N cheapest dates a
//! route worker fetches in phase 2.

use chrono::Timelike;
use fj_provider::FullOffer;

const RED_EYE_PENALTY: f64 = 20.0;
const OUTBOUND_STOP_PENALTY: f64 = 30.0;
const RETURN_STOP_PENALTY: f64 = 20.0;
const DURATION_PENALTY_PER_HOUR: f64 = 10.0;
/// Assumed cruise speed (mph) used to derive a "reasonable" baseline
/// flight duration from great-circle distance (spec.md §4.5).
const BASELINE_MPH: f64 = 500.0;

/// Red-eye departure hours: 22:00-23:59 and 00:00-05:59 (spec.md §4.5).
fn is_red_eye_hour(hour: u32) -> bool {
    (22..=23).contains(&hour) || hour <= 5
}

/// Scores `offer` against `distance_miles` (the great-circle distance
/// for the route, or `None` if either airport is unrecognized — in that
/// case the duration-penalty term contributes nothing rather than
/// erroring). Lower scores are better. Deterministic given identical
/// inputs (spec.md §8).
pub fn score_deal(offer: &FullOffer, distance_miles: Option<f64>) -> f64 {
    let mut score = offer.price;

    if let Some(distance) = distance_miles {
        let is_round_trip = offer.return_date.is_some();
        let baseline_hours = (distance / BASELINE_MPH) * if is_round_trip { 2.0 } else { 1.0 };
        let actual_hours = offer.total_duration_minutes() as f64 / 60.0;
        let extra_hours = (actual_hours - baseline_hours).max(0.0);
        score += extra_hours * DURATION_PENALTY_PER_HOUR;
    }

    score += offer.outbound_stops() as f64 * OUTBOUND_STOP_PENALTY;
    score += offer.return_stops() as f64 * RETURN_STOP_PENALTY;

    if let Some(leg) = offer.outbound.first() {
        if is_red_eye_hour(leg.departure_time.hour()) {
            score += RED_EYE_PENALTY;
        }
    }

    score
}
