// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::ResultStore;
use crate::types::{
    BulkSearchOffer, BulkSearchRecord, BulkSearchResult, BulkSearchStatus, ContinuousSweepProgress,
    ContinuousSweepStats, DetectedDeal, PriceGraphResult, RouteBaseline,
};

#[derive(Default)]
struct State {
    bulk_searches: HashMap<String, BulkSearchRecord>,
    offers: Vec<BulkSearchOffer>,
    results: Vec<BulkSearchResult>,
    price_graph_results: Vec<PriceGraphResult>,
    baselines: HashMap<(String, String), RouteBaseline>,
    deals: Vec<DetectedDeal>,
    continuous_sweep_progress: Option<ContinuousSweepProgress>,
    continuous_sweep_stats: Vec<ContinuousSweepStats>,
}

/// In-process stand-in for a Postgres-backed store, gated behind
/// `test-support` so production binaries never link it.
#[derive(Default)]
pub struct InMemoryResultStore {
    state: Mutex<State>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offers_for(&self, bulk_search_id: &str) -> Vec<BulkSearchOffer> {
        self.state
            .lock()
            .offers
            .iter()
            .filter(|o| o.bulk_search_id == bulk_search_id)
            .cloned()
            .collect()
    }

    pub fn deals(&self) -> Vec<DetectedDeal> {
        self.state.lock().deals.clone()
    }
}

fn route_key(origin: &str, destination: &str) -> (String, String) {
    (origin.to_string(), destination.to_string())
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0) * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

fn compute_baseline(prices: &mut [f64]) -> RouteBaseline {
    prices.sort_by(|a, b| a.partial_cmp(b).expect("prices are never NaN"));
    let n = prices.len();
    if n == 0 {
        return RouteBaseline::default();
    }
    let mean = prices.iter().sum::<f64>() / n as f64;
    let median = percentile(prices, 50.0);
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n as f64;
    RouteBaseline {
        sample_count: n as u32,
        mean,
        median,
        stddev: variance.sqrt(),
        p10: percentile(prices, 10.0),
        p25: percentile(prices, 25.0),
        p75: percentile(prices, 75.0),
        p90: percentile(prices, 90.0),
        min: prices[0],
        max: prices[n - 1],
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn create_bulk_search(&self, record: BulkSearchRecord) -> Result<(), StoreError> {
        self.state.lock().bulk_searches.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_bulk_search(&self, id: &str) -> Result<BulkSearchRecord, StoreError> {
        self.state
            .lock()
            .bulk_searches
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))
    }

    async fn update_bulk_search_status(
        &self,
        id: &str,
        status: BulkSearchStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let record = state
            .bulk_searches
            .get_mut(id)
            .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))?;
        if !record.status.can_transition_to(status) {
            return Err(StoreError::InvalidStatusTransition {
                from: format!("{:?}", record.status),
                to: format!("{:?}", status),
            });
        }
        record.status = status;
        Ok(())
    }

    async fn update_bulk_search_total_searches(
        &self,
        id: &str,
        total_searches: u32,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let record = state
            .bulk_searches
            .get_mut(id)
            .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))?;
        record.total_searches = total_searches;
        Ok(())
    }

    async fn increment_bulk_search_progress(
        &self,
        id: &str,
        price: Option<f64>,
        errored: bool,
    ) -> Result<(u32, u32), StoreError> {
        let mut state = self.state.lock();
        let record = state
            .bulk_searches
            .get_mut(id)
            .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))?;
        record.completed += 1;
        if errored {
            record.stats.error_count += 1;
        }
        if let Some(price) = price {
            record.stats.total_offers += 1;
            record.stats.min_price = Some(record.stats.min_price.map_or(price, |m| m.min(price)));
            record.stats.max_price = Some(record.stats.max_price.map_or(price, |m| m.max(price)));
            let prior_sum = record.stats.avg_price.unwrap_or(0.0) * (record.stats.total_offers - 1) as f64;
            record.stats.avg_price = Some((prior_sum + price) / record.stats.total_offers as f64);
        }
        Ok((record.completed, record.total_searches))
    }

    async fn finalize_bulk_search(
        &self,
        id: &str,
        status: BulkSearchStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let record = state
            .bulk_searches
            .get_mut(id)
            .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))?;
        if record.status.is_terminal() {
            return Ok(());
        }
        record.status = status;
        Ok(())
    }

    async fn insert_bulk_search_offer(&self, offer: BulkSearchOffer) -> Result<(), StoreError> {
        self.state.lock().offers.push(offer);
        Ok(())
    }

    async fn insert_bulk_search_result(&self, result: BulkSearchResult) -> Result<(), StoreError> {
        self.state.lock().results.push(result);
        Ok(())
    }

    async fn insert_price_graph_result(&self, result: PriceGraphResult) -> Result<(), StoreError> {
        self.state.lock().price_graph_results.push(result);
        Ok(())
    }

    async fn get_route_baseline(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Option<RouteBaseline>, StoreError> {
        Ok(self.state.lock().baselines.get(&route_key(origin, destination)).copied())
    }

    async fn refresh_route_baseline(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RouteBaseline, StoreError> {
        let mut state = self.state.lock();
        let mut prices: Vec<f64> = state
            .price_graph_results
            .iter()
            .filter(|r| r.origin == origin && r.destination == destination)
            .map(|r| r.price)
            .collect();
        let baseline = compute_baseline(&mut prices);
        state.baselines.insert(route_key(origin, destination), baseline);
        Ok(baseline)
    }

    async fn insert_detected_deal(&self, deal: DetectedDeal) -> Result<(), StoreError> {
        self.state.lock().deals.push(deal);
        Ok(())
    }

    async fn get_continuous_sweep_progress(
        &self,
    ) -> Result<Option<ContinuousSweepProgress>, StoreError> {
        Ok(self.state.lock().continuous_sweep_progress.clone())
    }

    async fn save_continuous_sweep_progress(
        &self,
        progress: ContinuousSweepProgress,
    ) -> Result<(), StoreError> {
        self.state.lock().continuous_sweep_progress = Some(progress);
        Ok(())
    }

    async fn record_continuous_sweep_stats(
        &self,
        stats: ContinuousSweepStats,
    ) -> Result<(), StoreError> {
        self.state.lock().continuous_sweep_stats.push(stats);
        Ok(())
    }
}
