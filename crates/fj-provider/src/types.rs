// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub use fj_core::{CabinClass, StopsPreference, TripType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Query options shared by `get_price_graph` and `get_offers` (spec.md
/// §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOptions {
    pub travelers: u32,
    pub currency: String,
    pub stops: StopsPreference,
    pub cabin: CabinClass,
    pub trip_type: TripType,
    pub language: String,
    #[serde(default)]
    pub excluded_airlines: HashSet<String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            travelers: 1,
            currency: "USD".to_string(),
            stops: StopsPreference::Any,
            cabin: CabinClass::Economy,
            trip_type: TripType::RoundTrip,
            language: "en".to_string(),
            excluded_airlines: HashSet::new(),
        }
    }
}
