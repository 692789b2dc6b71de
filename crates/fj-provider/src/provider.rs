// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `FlightsProvider` capability (spec.md §6): the third-party
//! flights scraper/client is an opaque collaborator. Only the contract
//! the core invokes is specified here.

use crate::error::ProviderError;
use crate::offer::{FullOffer, PriceGraphPoint, PriceRange};
use crate::types::ProviderOptions;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Arguments `serialize_url` turns into a shareable deep link, mirroring
/// whatever the route worker just queried.
#[derive(Debug, Clone)]
pub struct SerializeUrlArgs {
    pub origin: String,
    pub destination: String,
    pub departure: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub options: ProviderOptions,
}

#[async_trait]
pub trait FlightsProvider: Send + Sync {
    /// One provider call returning date -> price pairs over
    /// `[range_start, range_end]` for a given trip length.
    async fn get_price_graph(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        trip_length_days: Option<u32>,
        origin: &str,
        destination: &str,
        options: &ProviderOptions,
    ) -> Result<Vec<PriceGraphPoint>, ProviderError>;

    /// One provider call returning full itineraries (and the observed
    /// price range across them) for a single departure/return date pair.
    async fn get_offers(
        &self,
        departure: NaiveDate,
        return_date: Option<NaiveDate>,
        origin: &str,
        destination: &str,
        options: &ProviderOptions,
    ) -> Result<(Vec<FullOffer>, PriceRange), ProviderError>;

    /// Builds a deep link to the provider's UI for the given query, used
    /// when surfacing a persisted offer back to a human.
    fn serialize_url(&self, args: &SerializeUrlArgs) -> String;
}
