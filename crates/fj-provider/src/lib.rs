// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The `FlightsProvider` capability: the opaque third-party flights
//! scraper/client the core queries (spec.md §6).

pub mod error;
pub mod offer;
pub mod provider;
pub mod types;

pub use error::ProviderError;
pub use offer::{FullOffer, Leg, PriceGraphPoint, PriceRange};
pub use provider::{FlightsProvider, SerializeUrlArgs};
pub use types::{CabinClass, ProviderOptions, StopsPreference, TripType};

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFlightsProvider;
