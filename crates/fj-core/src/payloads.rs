// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire payload types shared across the handler crates: the shape a
//! `bulk_search` job is enqueued with, and the small option enums every
//! downstream crate (provider requests, persisted route payloads) keys
//! off of.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePayloadEnumError(pub &'static str);

impl fmt::Display for ParsePayloadEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {}", self.0)
    }
}

impl std::error::Error for ParsePayloadEnumError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one_way",
            TripType::RoundTrip => "round_trip",
        }
    }
}

impl FromStr for TripType {
    type Err = ParsePayloadEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_way" => Ok(TripType::OneWay),
            "round_trip" => Ok(TripType::RoundTrip),
            _ => Err(ParsePayloadEnumError("trip type")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

impl FromStr for CabinClass {
    type Err = ParsePayloadEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economy" => Ok(CabinClass::Economy),
            "premium_economy" => Ok(CabinClass::PremiumEconomy),
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            _ => Err(ParsePayloadEnumError("cabin class")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopsPreference {
    Any,
    Nonstop,
    OneStop,
}

impl StopsPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopsPreference::Any => "any",
            StopsPreference::Nonstop => "nonstop",
            StopsPreference::OneStop => "one_stop",
        }
    }
}

impl FromStr for StopsPreference {
    type Err = ParsePayloadEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(StopsPreference::Any),
            "nonstop" => Ok(StopsPreference::Nonstop),
            "one_stop" => Ok(StopsPreference::OneStop),
            _ => Err(ParsePayloadEnumError("stops preference")),
        }
    }
}

/// Payload carried by a `bulk_search` job (spec.md §4.5): the request
/// `BulkCoordinator` fans out into one `bulk_search_route` job per
/// (origin, destination) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSearchRequest {
    pub bulk_search_id: String,
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub departure_from: NaiveDate,
    pub departure_to: NaiveDate,
    pub return_from: Option<NaiveDate>,
    pub return_to: Option<NaiveDate>,
    pub trip_length_days: Option<u32>,
    pub trip_type: TripType,
    pub cabin: CabinClass,
    pub stops: StopsPreference,
    pub travelers: u32,
    pub currency: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

/// Payload carried by a `flight_search` job: a single-route, single-date
/// lookup enqueued directly by an operator/API caller rather than fanned
/// out by `BulkCoordinator`. Reuses the same route-level search algorithm
/// as a `bulk_search_route` job by wrapping itself in an ad-hoc one-route
/// bulk search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub trip_type: TripType,
    pub cabin: CabinClass,
    pub stops: StopsPreference,
    pub travelers: u32,
    pub currency: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_search_request_round_trips_through_json() {
        let request = BulkSearchRequest {
            bulk_search_id: "bs-1".to_string(),
            origins: vec!["JFK".to_string()],
            destinations: vec!["LAX".to_string(), "SFO".to_string()],
            departure_from: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            departure_to: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            return_from: None,
            return_to: None,
            trip_length_days: Some(7),
            trip_type: TripType::RoundTrip,
            cabin: CabinClass::Economy,
            stops: StopsPreference::Any,
            travelers: 1,
            currency: "USD".to_string(),
            excluded_airlines: HashSet::new(),
        };
        let json = serde_json::to_vec(&request).unwrap();
        let back: BulkSearchRequest = serde_json::from_slice(&json).unwrap();
        assert_eq!(back.destinations.len(), 2);
        assert_eq!(back.trip_type, TripType::RoundTrip);
    }

    #[test]
    fn flight_search_request_round_trips_through_json() {
        let request = FlightSearchRequest {
            origin: "JFK".to_string(),
            destination: "LAX".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 3, 8),
            trip_type: TripType::RoundTrip,
            cabin: CabinClass::Business,
            stops: StopsPreference::Nonstop,
            travelers: 2,
            currency: "USD".to_string(),
            excluded_airlines: HashSet::new(),
        };
        let json = serde_json::to_vec(&request).unwrap();
        let back: FlightSearchRequest = serde_json::from_slice(&json).unwrap();
        assert_eq!(back.origin, "JFK");
        assert_eq!(back.cabin, CabinClass::Business);
    }
}
