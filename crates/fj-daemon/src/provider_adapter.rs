// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HttpFlightsProvider`: the one concrete `FlightsProvider` this binary
//! needs to actually run jobs. The scraper/provider itself is out of
//! scope (spec.md §1) — this is a thin `reqwest` client dialing a
//! configurable base URL, translating its JSON responses into
//! `fj-provider`'s types and its failure modes into `ProviderError`.

use async_trait::async_trait;
use chrono::NaiveDate;
use fj_provider::{FlightsProvider, FullOffer, PriceGraphPoint, PriceRange, ProviderError, ProviderOptions, SerializeUrlArgs};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct HttpFlightsProvider {
    client: Client,
    base_url: String,
}

impl HttpFlightsProvider {
    pub fn new(base_url: impl Into<String>, call_timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn map_transport_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_status() {
            ProviderError::Upstream(err.to_string())
        } else {
            ProviderError::Upstream(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct PriceGraphRequest<'a> {
    range_start: NaiveDate,
    range_end: NaiveDate,
    trip_length_days: Option<u32>,
    origin: &'a str,
    destination: &'a str,
    options: &'a ProviderOptions,
}

#[derive(Debug, Deserialize)]
struct PriceGraphResponse {
    points: Vec<PriceGraphPoint>,
}

#[derive(Debug, Serialize)]
struct OffersRequest<'a> {
    departure: NaiveDate,
    return_date: Option<NaiveDate>,
    origin: &'a str,
    destination: &'a str,
    options: &'a ProviderOptions,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    offers: Vec<FullOffer>,
    range: PriceRange,
}

#[async_trait]
impl FlightsProvider for HttpFlightsProvider {
    async fn get_price_graph(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        trip_length_days: Option<u32>,
        origin: &str,
        destination: &str,
        options: &ProviderOptions,
    ) -> Result<Vec<PriceGraphPoint>, ProviderError> {
        let response = self
            .client
            .post(format!("{}/price-graph", self.base_url))
            .json(&PriceGraphRequest {
                range_start,
                range_end,
                trip_length_days,
                origin,
                destination,
                options,
            })
            .send()
            .await
            .map_err(Self::map_transport_error)?
            .error_for_status()
            .map_err(Self::map_transport_error)?
            .json::<PriceGraphResponse>()
            .await
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        Ok(response.points)
    }

    async fn get_offers(
        &self,
        departure: NaiveDate,
        return_date: Option<NaiveDate>,
        origin: &str,
        destination: &str,
        options: &ProviderOptions,
    ) -> Result<(Vec<FullOffer>, PriceRange), ProviderError> {
        let response = self
            .client
            .post(format!("{}/offers", self.base_url))
            .json(&OffersRequest {
                departure,
                return_date,
                origin,
                destination,
                options,
            })
            .send()
            .await
            .map_err(Self::map_transport_error)?
            .error_for_status()
            .map_err(Self::map_transport_error)?
            .json::<OffersResponse>()
            .await
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        Ok((response.offers, response.range))
    }

    fn serialize_url(&self, args: &SerializeUrlArgs) -> String {
        format!(
            "{}/deep-link?origin={}&destination={}&departure={}&return={}",
            self.base_url,
            args.origin,
            args.destination,
            args.departure,
            args.return_date.map(|d| d.to_string()).unwrap_or_default(),
        )
    }
}
