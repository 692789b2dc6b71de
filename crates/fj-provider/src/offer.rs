// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One point from a price-graph call: a candidate departure (and,
/// for round trips, return) date with its price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceGraphPoint {
    pub start_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub price: f64,
}

/// A single flown segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub city: String,
    pub flight_number: String,
    pub aircraft: String,
    pub legroom: Option<String>,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub duration_minutes: u32,
}

impl Leg {
    /// Dominant airline code, derived as the first two characters of the
    /// leading flight number (spec.md §3).
    pub fn airline_code(&self) -> String {
        self.flight_number.chars().take(2).collect()
    }
}

/// A full itinerary returned by `get_offers`: outbound legs and,
/// for round trips, return legs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullOffer {
    pub start_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub price: f64,
    pub currency: String,
    pub outbound: Vec<Leg>,
    pub return_legs: Vec<Leg>,
}

impl FullOffer {
    pub fn outbound_stops(&self) -> usize {
        self.outbound.len().saturating_sub(1)
    }

    pub fn return_stops(&self) -> usize {
        self.return_legs.len().saturating_sub(1)
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.outbound.iter().map(|l| l.duration_minutes).sum::<u32>()
            + self.return_legs.iter().map(|l| l.duration_minutes).sum::<u32>()
    }

    /// Dominant airline code for the itinerary: the leading outbound
    /// leg's carrier, falling back to the leading return leg.
    pub fn dominant_airline_code(&self) -> Option<String> {
        self.outbound
            .first()
            .or(self.return_legs.first())
            .map(Leg::airline_code)
    }
}

/// Observed min/max price across a batch of offers, as `get_offers`
/// returns alongside the itinerary list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(flight_number: &str, duration: u32) -> Leg {
        Leg {
            departure_airport: "JFK".to_string(),
            arrival_airport: "LAX".to_string(),
            city: "Los Angeles".to_string(),
            flight_number: flight_number.to_string(),
            aircraft: "A320".to_string(),
            legroom: None,
            departure_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            duration_minutes: duration,
        }
    }

    #[test]
    fn airline_code_is_first_two_chars_of_flight_number() {
        assert_eq!(leg("AA1234", 60).airline_code(), "AA");
        assert_eq!(leg("B61234", 60).airline_code(), "B6");
    }

    #[test]
    fn stops_are_segment_count_minus_one() {
        let offer = FullOffer {
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            return_date: None,
            price: 300.0,
            currency: "USD".to_string(),
            outbound: vec![leg("AA100", 180), leg("AA200", 120)],
            return_legs: vec![],
        };
        assert_eq!(offer.outbound_stops(), 1);
        assert_eq!(offer.return_stops(), 0);
    }

    #[test]
    fn total_duration_sums_both_legs() {
        let offer = FullOffer {
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            return_date: None,
            price: 300.0,
            currency: "USD".to_string(),
            outbound: vec![leg("AA100", 180)],
            return_legs: vec![leg("AA200", 300)],
        };
        assert_eq!(offer.total_duration_minutes(), 480);
    }

    #[test]
    fn dominant_airline_prefers_outbound() {
        let offer = FullOffer {
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            return_date: None,
            price: 300.0,
            currency: "USD".to_string(),
            outbound: vec![leg("DL500", 180)],
            return_legs: vec![leg("AA200", 300)],
        };
        assert_eq!(offer.dominant_airline_code().as_deref(), Some("DL"));
    }
}
