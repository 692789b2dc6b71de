// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::StoreError;
use crate::store::ResultStore;
use crate::types::{
    BulkSearchAggregateStats, BulkSearchOffer, BulkSearchRecord, BulkSearchResult,
    BulkSearchStatus, ContinuousSweepProgress, ContinuousSweepStats, DetectedDeal,
    PriceGraphResult, RouteBaseline,
};

fn status_str(status: BulkSearchStatus) -> &'static str {
    match status {
        BulkSearchStatus::Queued => "queued",
        BulkSearchStatus::Coordinating => "coordinating",
        BulkSearchStatus::Running => "running",
        BulkSearchStatus::Completed => "completed",
        BulkSearchStatus::CompletedWithErrors => "completed_with_errors",
        BulkSearchStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> BulkSearchStatus {
    match s {
        "coordinating" => BulkSearchStatus::Coordinating,
        "running" => BulkSearchStatus::Running,
        "completed" => BulkSearchStatus::Completed,
        "completed_with_errors" => BulkSearchStatus::CompletedWithErrors,
        "failed" => BulkSearchStatus::Failed,
        _ => BulkSearchStatus::Queued,
    }
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

/// Queries are built with the runtime-checked `sqlx::query`/`query_as`
/// API rather than the `query!` macros, so this crate links against no
/// particular live schema at compile time.
pub struct PostgresResultStore {
    pool: PgPool,
}

impl PostgresResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PostgresResultStore {
    async fn create_bulk_search(&self, record: BulkSearchRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bulk_searches (id, total_searches, completed, currency, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.id)
        .bind(record.total_searches as i32)
        .bind(record.completed as i32)
        .bind(&record.currency)
        .bind(status_str(record.status))
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_bulk_search(&self, id: &str) -> Result<BulkSearchRecord, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, total_searches, completed, currency, status, created_at,
                   min_price, max_price, avg_price, error_count, total_offers
            FROM bulk_searches WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))?;

        Ok(BulkSearchRecord {
            id: row.try_get("id")?,
            total_searches: row.try_get::<i32, _>("total_searches")? as u32,
            completed: row.try_get::<i32, _>("completed")? as u32,
            currency: row.try_get("currency")?,
            status: status_from_str(row.try_get("status")?),
            stats: BulkSearchAggregateStats {
                min_price: row.try_get("min_price")?,
                max_price: row.try_get("max_price")?,
                avg_price: row.try_get("avg_price")?,
                error_count: row.try_get::<i32, _>("error_count")? as u32,
                total_offers: row.try_get::<i32, _>("total_offers")? as u32,
            },
            created_at: row.try_get("created_at")?,
        })
    }

    async fn update_bulk_search_status(
        &self,
        id: &str,
        status: BulkSearchStatus,
    ) -> Result<(), StoreError> {
        let current = self.get_bulk_search(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(StoreError::InvalidStatusTransition {
                from: format!("{:?}", current.status),
                to: format!("{:?}", status),
            });
        }
        sqlx::query("UPDATE bulk_searches SET status = $1 WHERE id = $2")
            .bind(status_str(status))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_bulk_search_total_searches(
        &self,
        id: &str,
        total_searches: u32,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE bulk_searches SET total_searches = $1 WHERE id = $2")
            .bind(total_searches as i32)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_bulk_search_progress(
        &self,
        id: &str,
        price: Option<f64>,
        errored: bool,
    ) -> Result<(u32, u32), StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE bulk_searches SET
                completed = completed + 1,
                error_count = error_count + CASE WHEN $2 THEN 1 ELSE 0 END,
                total_offers = total_offers + CASE WHEN $3::double precision IS NOT NULL THEN 1 ELSE 0 END,
                min_price = LEAST(COALESCE(min_price, $3), COALESCE($3, min_price)),
                max_price = GREATEST(COALESCE(max_price, $3), COALESCE($3, max_price)),
                avg_price = CASE WHEN $3::double precision IS NOT NULL
                    THEN (COALESCE(avg_price, 0) * total_offers + $3) / (total_offers + 1)
                    ELSE avg_price
                END
            WHERE id = $1
            RETURNING completed, total_searches
            "#,
        )
        .bind(id)
        .bind(errored)
        .bind(price)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::BulkSearchNotFound(id.to_string()))?;

        Ok((
            row.try_get::<i32, _>("completed")? as u32,
            row.try_get::<i32, _>("total_searches")? as u32,
        ))
    }

    async fn finalize_bulk_search(
        &self,
        id: &str,
        status: BulkSearchStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE bulk_searches SET status = $1
            WHERE id = $2 AND status NOT IN ('completed', 'completed_with_errors', 'failed')
            "#,
        )
        .bind(status_str(status))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_bulk_search_offer(&self, offer: BulkSearchOffer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bulk_search_offers
                (bulk_search_id, origin, destination, origin_city, destination_city,
                 departure_date, return_date, price, currency, airline_code,
                 total_duration_minutes, outbound_legs, return_legs, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&offer.bulk_search_id)
        .bind(&offer.origin)
        .bind(&offer.destination)
        .bind(&offer.origin_city)
        .bind(&offer.destination_city)
        .bind(offer.departure_date)
        .bind(offer.return_date)
        .bind(offer.price)
        .bind(&offer.currency)
        .bind(&offer.airline_code)
        .bind(offer.total_duration_minutes as i32)
        .bind(&offer.outbound_legs_json)
        .bind(&offer.return_legs_json)
        .bind(offer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_bulk_search_result(&self, result: BulkSearchResult) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bulk_search_results (bulk_search_id, origin, destination, price, error)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&result.bulk_search_id)
        .bind(&result.origin)
        .bind(&result.destination)
        .bind(result.price)
        .bind(&result.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_price_graph_result(&self, result: PriceGraphResult) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO price_graph_results
                (origin, destination, departure_date, return_date, trip_length_days,
                 price, currency, distance_miles, cost_per_mile, travelers, cabin, stops)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&result.origin)
        .bind(&result.destination)
        .bind(result.departure_date)
        .bind(result.return_date)
        .bind(result.trip_length_days.map(|d| d as i32))
        .bind(result.price)
        .bind(&result.currency)
        .bind(result.distance_miles)
        .bind(result.cost_per_mile)
        .bind(result.travelers as i32)
        .bind(&result.cabin)
        .bind(&result.stops)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_route_baseline(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Option<RouteBaseline>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sample_count, mean, median, stddev, p10, p25, p75, p90, min, max
            FROM route_baselines WHERE origin = $1 AND destination = $2
            "#,
        )
        .bind(origin)
        .bind(destination)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(RouteBaseline {
            sample_count: row.try_get::<i32, _>("sample_count")? as u32,
            mean: row.try_get("mean")?,
            median: row.try_get("median")?,
            stddev: row.try_get("stddev")?,
            p10: row.try_get("p10")?,
            p25: row.try_get("p25")?,
            p75: row.try_get("p75")?,
            p90: row.try_get("p90")?,
            min: row.try_get("min")?,
            max: row.try_get("max")?,
        }))
    }

    async fn refresh_route_baseline(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RouteBaseline, StoreError> {
        let rows = sqlx::query("SELECT price FROM price_graph_results WHERE origin = $1 AND destination = $2")
            .bind(origin)
            .bind(destination)
            .fetch_all(&self.pool)
            .await?;

        let mut prices: Vec<f64> = rows
            .iter()
            .map(|r| r.try_get::<f64, _>("price"))
            .collect::<Result<_, _>>()?;
        prices.sort_by(|a, b| a.partial_cmp(b).expect("prices are never NaN"));

        let baseline = if prices.is_empty() {
            RouteBaseline::default()
        } else {
            let n = prices.len();
            let mean = prices.iter().sum::<f64>() / n as f64;
            let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n as f64;
            RouteBaseline {
                sample_count: n as u32,
                mean,
                median: percentile(&prices, 50.0),
                stddev: variance.sqrt(),
                p10: percentile(&prices, 10.0),
                p25: percentile(&prices, 25.0),
                p75: percentile(&prices, 75.0),
                p90: percentile(&prices, 90.0),
                min: prices[0],
                max: prices[n - 1],
            }
        };

        sqlx::query(
            r#"
            INSERT INTO route_baselines
                (origin, destination, sample_count, mean, median, stddev, p10, p25, p75, p90, min, max)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (origin, destination) DO UPDATE SET
                sample_count = EXCLUDED.sample_count,
                mean = EXCLUDED.mean,
                median = EXCLUDED.median,
                stddev = EXCLUDED.stddev,
                p10 = EXCLUDED.p10,
                p25 = EXCLUDED.p25,
                p75 = EXCLUDED.p75,
                p90 = EXCLUDED.p90,
                min = EXCLUDED.min,
                max = EXCLUDED.max
            "#,
        )
        .bind(origin)
        .bind(destination)
        .bind(baseline.sample_count as i32)
        .bind(baseline.mean)
        .bind(baseline.median)
        .bind(baseline.stddev)
        .bind(baseline.p10)
        .bind(baseline.p25)
        .bind(baseline.p75)
        .bind(baseline.p90)
        .bind(baseline.min)
        .bind(baseline.max)
        .execute(&self.pool)
        .await?;

        Ok(baseline)
    }

    async fn insert_detected_deal(&self, deal: DetectedDeal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO detected_deals
                (origin, destination, departure_date, price, baseline_mean, discount_pct, detected_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&deal.origin)
        .bind(&deal.destination)
        .bind(deal.departure_date)
        .bind(deal.price)
        .bind(deal.baseline_mean)
        .bind(deal.discount_pct)
        .bind(deal.detected_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_continuous_sweep_progress(
        &self,
    ) -> Result<Option<ContinuousSweepProgress>, StoreError> {
        let row = sqlx::query("SELECT data FROM continuous_sweep_progress WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };
        let data: serde_json::Value = row.try_get("data")?;
        Ok(Some(serde_json::from_value(data)?))
    }

    async fn save_continuous_sweep_progress(
        &self,
        progress: ContinuousSweepProgress,
    ) -> Result<(), StoreError> {
        let data = serde_json::to_value(&progress)?;
        sqlx::query(
            r#"
            INSERT INTO continuous_sweep_progress (id, data) VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_continuous_sweep_stats(
        &self,
        stats: ContinuousSweepStats,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO continuous_sweep_stats
                (sweep_number, duration_secs, queries_completed, error_count, avg_delay_ms,
                 observed_min_price, observed_max_price, finished_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(stats.sweep_number as i64)
        .bind(stats.duration_secs)
        .bind(stats.queries_completed as i64)
        .bind(stats.error_count as i64)
        .bind(stats.avg_delay_ms)
        .bind(stats.observed_min_price)
        .bind(stats.observed_max_price)
        .bind(stats.finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
