// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted `FlightsProvider` for route-worker and sweep tests. Records
//! call counts so tests can assert the cheap-first fan-out shape (spec.md
//! §8 scenarios 1-2: "exactly 1 price-graph call", "exactly 1 GetOffers
//! call").

use crate::error::ProviderError;
use crate::offer::{FullOffer, PriceGraphPoint, PriceRange};
use crate::provider::{FlightsProvider, SerializeUrlArgs};
use crate::types::ProviderOptions;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct PriceGraphCall {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Clone)]
pub struct OffersCall {
    pub departure: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub origin: String,
    pub destination: String,
}

#[derive(Default)]
struct Inner {
    price_graph_responses: VecDeque<Result<Vec<PriceGraphPoint>, ProviderError>>,
    offers_responses: VecDeque<Result<(Vec<FullOffer>, PriceRange), ProviderError>>,
    price_graph_calls: Vec<PriceGraphCall>,
    offers_calls: Vec<OffersCall>,
}

/// Queue up canned responses with `push_price_graph`/`push_offers`; each
/// call to `get_price_graph`/`get_offers` pops the next one. When the
/// queue runs dry, the last response is replayed so a single canned
/// answer is enough for tests that don't care about call count.
#[derive(Default)]
pub struct FakeFlightsProvider {
    inner: Mutex<Inner>,
}

impl FakeFlightsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_price_graph(&self, points: Vec<PriceGraphPoint>) {
        self.inner.lock().price_graph_responses.push_back(Ok(points));
    }

    pub fn push_price_graph_error(&self, error: ProviderError) {
        self.inner.lock().price_graph_responses.push_back(Err(error));
    }

    pub fn push_offers(&self, offers: Vec<FullOffer>, range: PriceRange) {
        self.inner
            .lock()
            .offers_responses
            .push_back(Ok((offers, range)));
    }

    pub fn push_offers_error(&self, error: ProviderError) {
        self.inner.lock().offers_responses.push_back(Err(error));
    }

    pub fn price_graph_call_count(&self) -> usize {
        self.inner.lock().price_graph_calls.len()
    }

    pub fn offers_call_count(&self) -> usize {
        self.inner.lock().offers_calls.len()
    }

    pub fn offers_calls(&self) -> Vec<OffersCall> {
        self.inner.lock().offers_calls.clone()
    }
}

#[async_trait]
impl FlightsProvider for FakeFlightsProvider {
    async fn get_price_graph(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        _trip_length_days: Option<u32>,
        origin: &str,
        destination: &str,
        _options: &ProviderOptions,
    ) -> Result<Vec<PriceGraphPoint>, ProviderError> {
        let mut inner = self.inner.lock();
        inner.price_graph_calls.push(PriceGraphCall {
            range_start,
            range_end,
            origin: origin.to_string(),
            destination: destination.to_string(),
        });
        match inner.price_graph_responses.len() {
            0 => Ok(Vec::new()),
            1 => inner.price_graph_responses.front().cloned().unwrap(),
            _ => inner.price_graph_responses.pop_front().unwrap(),
        }
    }

    async fn get_offers(
        &self,
        departure: NaiveDate,
        return_date: Option<NaiveDate>,
        origin: &str,
        destination: &str,
        _options: &ProviderOptions,
    ) -> Result<(Vec<FullOffer>, PriceRange), ProviderError> {
        let mut inner = self.inner.lock();
        inner.offers_calls.push(OffersCall {
            departure,
            return_date,
            origin: origin.to_string(),
            destination: destination.to_string(),
        });
        match inner.offers_responses.len() {
            0 => Ok((Vec::new(), PriceRange { min: 0.0, max: 0.0 })),
            1 => inner.offers_responses.front().cloned().unwrap(),
            _ => inner.offers_responses.pop_front().unwrap(),
        }
    }

    fn serialize_url(&self, args: &SerializeUrlArgs) -> String {
        format!(
            "https://fake-provider.test/search?from={}&to={}&date={}",
            args.origin, args.destination, args.departure
        )
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
