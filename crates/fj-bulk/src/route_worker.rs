// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RouteWorker`: handler for `bulk_search_route` jobs (spec.md §4.5).
//! Executes the two-phase "cheap-first" algorithm (or the single-date
//! fast path) for one (origin, destination) pair and persists the
//! single best offer found.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use fj_core::job::Job;
use fj_core::{haversine_miles, is_safe_price, CabinClass, StopsPreference};
use fj_provider::{FlightsProvider, FullOffer, ProviderError, ProviderOptions};
use fj_resultstore::{BulkSearchOffer, BulkSearchResult, BulkSearchStatus, ResultStore, RoutePayload};

use crate::error::BulkError;
use crate::score::score_deal;

/// A candidate best offer plus the date pair it was found for.
struct Best {
    offer: FullOffer,
    score: f64,
}

pub struct RouteWorker<P: FlightsProvider, R: ResultStore> {
    provider: Arc<P>,
    store: Arc<R>,
    top_n: usize,
    provider_call_timeout: Duration,
}

impl<P: FlightsProvider, R: ResultStore> RouteWorker<P, R> {
    pub fn new(provider: Arc<P>, store: Arc<R>, top_n: usize, provider_call_timeout: Duration) -> Self {
        Self {
            provider,
            store,
            top_n: top_n.max(1),
            provider_call_timeout,
        }
    }

    pub async fn handle_job(&self, job: &Job) -> Result<(), BulkError> {
        let payload: RoutePayload = job
            .payload_as()
            .map_err(|err| BulkError::Validation(format!("invalid bulk_search_route payload: {err}")))?;
        self.process_route(payload).await;
        Ok(())
    }

    fn options(payload: &RoutePayload) -> ProviderOptions {
        ProviderOptions {
            travelers: payload.travelers,
            currency: payload.currency.clone(),
            stops: StopsPreference::from_str(&payload.stops).unwrap_or(StopsPreference::Any),
            cabin: CabinClass::from_str(&payload.cabin).unwrap_or(CabinClass::Economy),
            trip_type: payload.trip_type,
            language: "en".to_string(),
            excluded_airlines: payload.excluded_airlines.clone(),
        }
    }

    async fn call_get_offers(
        &self,
        departure: NaiveDate,
        return_date: Option<NaiveDate>,
        origin: &str,
        destination: &str,
        options: &ProviderOptions,
    ) -> Result<Vec<FullOffer>, ProviderError> {
        let fut = self
            .provider
            .get_offers(departure, return_date, origin, destination, options);
        match tokio::time::timeout(self.provider_call_timeout, fut).await {
            Ok(result) => result.map(|(offers, _range)| offers),
            Err(_) => Err(ProviderError::Timeout),
        }
    }

    /// Scores every offer in `offers` that survives the excluded-airline
    /// and DB-safe-price filters, keeping the lowest-scoring one.
    fn best_of(
        offers: Vec<FullOffer>,
        excluded_airlines: &HashSet<String>,
        distance_miles: Option<f64>,
    ) -> Option<Best> {
        offers
            .into_iter()
            .filter(|offer| is_safe_price(offer.price))
            .filter(|offer| {
                offer
                    .dominant_airline_code()
                    .map(|code| !excluded_airlines.contains(&code))
                    .unwrap_or(true)
            })
            .map(|offer| {
                let score = score_deal(&offer, distance_miles);
                Best { offer, score }
            })
            .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Runs the per-route algorithm described in spec.md §4.5 and
    /// persists the result. Provider/store errors are logged and
    /// counted but never returned: the bulk-search progress counter
    /// must advance exactly once per route regardless of whether a
    /// usable offer was found, or the coordinator's finalize step would
    /// hang (spec.md §4.5 "Error policy inside a route worker").
    pub(crate) async fn process_route(&self, payload: RoutePayload) {
        let options = Self::options(&payload);
        let distance_miles = haversine_miles(&payload.origin, &payload.destination);
        let mut errored = false;

        let best = if payload.departure_from == payload.departure_to {
            self.single_date_fast_path(&payload, &options, distance_miles, &mut errored)
                .await
        } else {
            self.cheap_first(&payload, &options, distance_miles, &mut errored).await
        };

        let price = best.as_ref().map(|b| b.offer.price);
        if let Some(best) = best {
            self.persist_best(&payload, best).await;
        } else {
            let _ = self
                .store
                .insert_bulk_search_result(BulkSearchResult {
                    bulk_search_id: payload.bulk_search_id.clone(),
                    origin: payload.origin.clone(),
                    destination: payload.destination.clone(),
                    price: None,
                    error: if errored {
                        Some("no usable offer found".to_string())
                    } else {
                        None
                    },
                })
                .await;
        }

        self.advance_progress(&payload.bulk_search_id, price, errored).await;
    }

    async fn single_date_fast_path(
        &self,
        payload: &RoutePayload,
        options: &ProviderOptions,
        distance_miles: Option<f64>,
        errored: &mut bool,
    ) -> Option<Best> {
        let return_date = match payload.trip_type {
            fj_core::TripType::RoundTrip => payload
                .trip_length_days
                .map(|days| payload.departure_from + chrono::Duration::days(days as i64)),
            fj_core::TripType::OneWay => None,
        };
        match self
            .call_get_offers(
                payload.departure_from,
                return_date,
                &payload.origin,
                &payload.destination,
                options,
            )
            .await
        {
            Ok(offers) => Self::best_of(offers, &payload.excluded_airlines, distance_miles),
            Err(err) => {
                tracing::warn!(origin = %payload.origin, destination = %payload.destination, error = %err, "single-date get_offers call failed");
                *errored = true;
                None
            }
        }
    }

    async fn cheap_first(
        &self,
        payload: &RoutePayload,
        options: &ProviderOptions,
        distance_miles: Option<f64>,
        errored: &mut bool,
    ) -> Option<Best> {
        let fut = self.provider.get_price_graph(
            payload.departure_from,
            payload.departure_to,
            payload.trip_length_days,
            &payload.origin,
            &payload.destination,
            options,
        );
        let points = match tokio::time::timeout(self.provider_call_timeout, fut).await {
            Ok(Ok(points)) => points,
            Ok(Err(err)) => {
                tracing::warn!(origin = %payload.origin, destination = %payload.destination, error = %err, "price-graph call failed");
                *errored = true;
                return None;
            }
            Err(_) => {
                tracing::warn!(origin = %payload.origin, destination = %payload.destination, "price-graph call timed out");
                *errored = true;
                return None;
            }
        };

        let mut candidates: Vec<_> = points.into_iter().filter(|p| is_safe_price(p.price)).collect();
        candidates.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(self.top_n);

        let mut best: Option<Best> = None;
        for point in candidates {
            match self
                .call_get_offers(
                    point.start_date,
                    point.return_date,
                    &payload.origin,
                    &payload.destination,
                    options,
                )
                .await
            {
                Ok(offers) => {
                    if let Some(candidate) = Self::best_of(offers, &payload.excluded_airlines, distance_miles) {
                        if best.as_ref().map(|b| candidate.score < b.score).unwrap_or(true) {
                            best = Some(candidate);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(origin = %payload.origin, destination = %payload.destination, date = %point.start_date, error = %err, "phase-2 get_offers call failed");
                    *errored = true;
                }
            }
        }
        best
    }

    async fn persist_best(&self, payload: &RoutePayload, best: Best) {
        let offer = best.offer;
        let airline_code = offer.dominant_airline_code();
        let outbound_json = serde_json::to_value(&offer.outbound).unwrap_or(serde_json::Value::Null);
        let return_json = serde_json::to_value(&offer.return_legs).unwrap_or(serde_json::Value::Null);
        let record = BulkSearchOffer {
            bulk_search_id: payload.bulk_search_id.clone(),
            origin: payload.origin.clone(),
            destination: payload.destination.clone(),
            origin_city: offer.outbound.first().map(|leg| leg.city.clone()),
            destination_city: offer
                .outbound
                .last()
                .map(|leg| leg.city.clone())
                .or_else(|| offer.return_legs.first().map(|leg| leg.city.clone())),
            departure_date: offer.start_date,
            return_date: offer.return_date,
            price: offer.price,
            currency: offer.currency.clone(),
            airline_code,
            total_duration_minutes: offer.total_duration_minutes(),
            outbound_legs_json: outbound_json,
            return_legs_json: return_json,
            created_at: chrono::Utc::now(),
        };
        if let Err(err) = self.store.insert_bulk_search_offer(record).await {
            tracing::error!(bulk_search_id = %payload.bulk_search_id, error = %err, "failed to persist best offer");
        }
        let _ = self
            .store
            .insert_bulk_search_result(BulkSearchResult {
                bulk_search_id: payload.bulk_search_id.clone(),
                origin: payload.origin.clone(),
                destination: payload.destination.clone(),
                price: Some(offer.price),
                error: None,
            })
            .await;
    }

    async fn advance_progress(&self, bulk_search_id: &str, price: Option<f64>, errored: bool) {
        let (completed, total) = match self
            .store
            .increment_bulk_search_progress(bulk_search_id, price, errored)
            .await
        {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(bulk_search_id, error = %err, "failed to increment bulk-search progress");
                return;
            }
        };
        if completed < total {
            return;
        }
        self.finalize(bulk_search_id).await;
    }

    /// Finalizes the bulk search once `completed >= total`. Guarded by
    /// `finalize_bulk_search` itself: only a non-terminal record
    /// transitions, so concurrent route workers racing the last
    /// increment produce exactly one effective finalize (spec.md §9).
    async fn finalize(&self, bulk_search_id: &str) {
        let record = match self.store.get_bulk_search(bulk_search_id).await {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(bulk_search_id, error = %err, "failed to read bulk-search record for finalize");
                return;
            }
        };
        let status = if record.stats.total_offers == 0 {
            BulkSearchStatus::Failed
        } else if record.stats.error_count > 0 {
            BulkSearchStatus::CompletedWithErrors
        } else {
            BulkSearchStatus::Completed
        };
        if let Err(err) = self.store.finalize_bulk_search(bulk_search_id, status).await {
            tracing::error!(bulk_search_id, error = %err, "failed to finalize bulk search");
        }
    }
}

#[cfg(test)]
#[path = "route_worker_tests.rs"]
mod tests;
