// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Great-circle distance between IATA airport codes, used by
//! `fj-sweep`'s cost-per-mile column and `fj-bulk`'s `scoreDeal` baseline
//! hours calculation.

use std::collections::HashMap;
use std::sync::OnceLock;

const EARTH_RADIUS_MILES: f64 = 3_958.8;

/// A handful of high-traffic airports, enough to ground distance-based
/// scoring in tests and in the sweep's cost-per-mile column without
/// depending on an external geo database. Unknown codes simply fall back
/// to `None` — callers treat a missing distance as "skip the
/// distance-derived term", never as an error.
fn coords() -> &'static HashMap<&'static str, (f64, f64)> {
    static COORDS: OnceLock<HashMap<&'static str, (f64, f64)>> = OnceLock::new();
    COORDS.get_or_init(|| {
        HashMap::from([
            ("JFK", (40.6413, -73.7781)),
            ("LGA", (40.7769, -73.8740)),
            ("EWR", (40.6895, -74.1745)),
            ("LAX", (33.9416, -118.4085)),
            ("SFO", (37.6213, -122.3790)),
            ("ORD", (41.9742, -87.9073)),
            ("ATL", (33.6407, -84.4277)),
            ("DFW", (32.8998, -97.0403)),
            ("DEN", (39.8561, -104.6737)),
            ("SEA", (47.4502, -122.3088)),
            ("MIA", (25.7959, -80.2870)),
            ("BOS", (42.3656, -71.0096)),
            ("LHR", (51.4700, -0.4543)),
            ("CDG", (49.0097, 2.5479)),
            ("AMS", (52.3105, 4.7683)),
            ("FRA", (50.0379, 8.5622)),
            ("MAD", (40.4983, -3.5676)),
            ("FCO", (41.8003, 12.2389)),
            ("DXB", (25.2532, 55.3657)),
            ("HND", (35.5494, 139.7798)),
            ("NRT", (35.7720, 140.3929)),
            ("SIN", (1.3644, 103.9915)),
            ("HKG", (22.3080, 113.9185)),
            ("SYD", (-33.9461, 151.1772)),
            ("GRU", (-23.4356, -46.4731)),
            ("YYZ", (43.6777, -79.6248)),
            ("MEX", (19.4363, -99.0721)),
        ])
    })
}

/// Returns the (latitude, longitude) in degrees for a known IATA code.
pub fn airport_coords(iata: &str) -> Option<(f64, f64)> {
    coords().get(iata.to_ascii_uppercase().as_str()).copied()
}

/// Great-circle distance in statute miles between two points given in
/// degrees.
pub fn haversine_distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// Distance in miles between two IATA codes, or `None` if either is
/// unrecognized.
pub fn haversine_miles(origin: &str, destination: &str) -> Option<f64> {
    let (lat1, lon1) = airport_coords(origin)?;
    let (lat2, lon2) = airport_coords(destination)?;
    Some(haversine_distance_miles(lat1, lon1, lat2, lon2))
}

#[cfg(test)]
#[path = "geo_tests.rs"]
mod tests;
