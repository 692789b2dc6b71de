// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{
    BulkSearchOffer, BulkSearchRecord, BulkSearchResult, BulkSearchStatus, ContinuousSweepProgress,
    ContinuousSweepStats, DetectedDeal, PriceGraphResult, RouteBaseline,
};

/// Persistence boundary consumed by the coordination/worker crates
/// (spec.md §6: `ResultStore`). Every mutator that touches
/// `BulkSearchRecord.completed` must be atomic with respect to other
/// callers racing the same id — route workers finish concurrently.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn create_bulk_search(&self, record: BulkSearchRecord) -> Result<(), StoreError>;

    async fn get_bulk_search(&self, id: &str) -> Result<BulkSearchRecord, StoreError>;

    async fn update_bulk_search_status(
        &self,
        id: &str,
        status: BulkSearchStatus,
    ) -> Result<(), StoreError>;

    /// Patches `total_searches` downward when some routes failed to
    /// enqueue (spec.md §4.5 step 2) so the completion ratio still
    /// reaches 100%.
    async fn update_bulk_search_total_searches(
        &self,
        id: &str,
        total_searches: u32,
    ) -> Result<(), StoreError>;

    /// Atomically increments `completed` by one and folds `price` (if
    /// any) into the running min/max/avg, returning the post-increment
    /// `(completed, total_searches)` pair so the caller can decide
    /// whether this was the call that finished the bulk search.
    async fn increment_bulk_search_progress(
        &self,
        id: &str,
        price: Option<f64>,
        errored: bool,
    ) -> Result<(u32, u32), StoreError>;

    /// Transitions a bulk search to a terminal status. No-op (not an
    /// error) if it is already terminal, since route workers racing the
    /// last increment could both observe completion.
    async fn finalize_bulk_search(
        &self,
        id: &str,
        status: BulkSearchStatus,
    ) -> Result<(), StoreError>;

    async fn insert_bulk_search_offer(&self, offer: BulkSearchOffer) -> Result<(), StoreError>;

    async fn insert_bulk_search_result(&self, result: BulkSearchResult) -> Result<(), StoreError>;

    async fn insert_price_graph_result(&self, result: PriceGraphResult) -> Result<(), StoreError>;

    async fn get_route_baseline(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Option<RouteBaseline>, StoreError>;

    /// Recomputes and persists the baseline for a route from its
    /// historical price-graph samples (spec.md §4.7 deal detection).
    async fn refresh_route_baseline(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RouteBaseline, StoreError>;

    async fn insert_detected_deal(&self, deal: DetectedDeal) -> Result<(), StoreError>;

    async fn get_continuous_sweep_progress(
        &self,
    ) -> Result<Option<ContinuousSweepProgress>, StoreError>;

    async fn save_continuous_sweep_progress(
        &self,
        progress: ContinuousSweepProgress,
    ) -> Result<(), StoreError>;

    async fn record_continuous_sweep_stats(
        &self,
        stats: ContinuousSweepStats,
    ) -> Result<(), StoreError>;
}
