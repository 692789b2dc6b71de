// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fj_core::test_support::JobBuilder;
use fj_core::{JobType, QueueName, StopsPreference};
use fj_provider::{FakeFlightsProvider, PriceGraphPoint};
use fj_queue::fake::InMemoryQueueStore;
use fj_resultstore::InMemoryResultStore;

fn payload() -> PriceGraphSweepPayload {
    PriceGraphSweepPayload {
        origins: vec!["JFK".to_string()],
        destinations: vec!["LAX".to_string()],
        trip_lengths_days: vec![7],
        cabins: vec![CabinClass::Economy],
        stops: StopsPreference::Any,
        departure_from: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        departure_to: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        travelers: 1,
        currency: "USD".to_string(),
        excluded_airlines: HashSet::new(),
    }
}

fn harness() -> (
    Arc<FakeFlightsProvider>,
    Arc<InMemoryResultStore>,
    Arc<InMemoryQueueStore>,
    PriceGraphSweep<FakeFlightsProvider, InMemoryResultStore, InMemoryQueueStore>,
) {
    let provider = Arc::new(FakeFlightsProvider::new());
    let store = Arc::new(InMemoryResultStore::new());
    let queue = Arc::new(InMemoryQueueStore::new());
    let sweep = PriceGraphSweep::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        Arc::clone(&queue),
        Duration::from_millis(0),
    );
    (provider, store, queue, sweep)
}

#[tokio::test]
async fn inserts_one_row_per_valid_date() {
    let (provider, store, _queue, sweep) = harness();
    provider.push_price_graph(vec![
        PriceGraphPoint {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            return_date: Some(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()),
            price: 310.0,
        },
        PriceGraphPoint {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            return_date: Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()),
            price: 280.0,
        },
    ]);

    let job = JobBuilder::new(QueueName::PriceGraphSweep, JobType::PriceGraphSweep)
        .payload_json(serde_json::to_value(payload()).unwrap())
        .build();
    let outcome = sweep.handle_job(&job).await.unwrap();

    assert_eq!(outcome.rows_inserted, 2);
    assert_eq!(outcome.errors, 0);
    assert_eq!(outcome.status(), SweepStatus::Completed);
    let baseline = store.refresh_route_baseline("JFK", "LAX").await.unwrap();
    assert_eq!(baseline.sample_count, 2);
}

#[tokio::test]
async fn invalid_and_unpriced_points_are_skipped_without_counting_as_errors() {
    let (provider, store, _queue, sweep) = harness();
    provider.push_price_graph(vec![
        PriceGraphPoint {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            return_date: None,
            price: f64::NAN,
        },
        PriceGraphPoint {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            return_date: None,
            price: -50.0,
        },
        PriceGraphPoint {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            return_date: None,
            price: 199.0,
        },
    ]);

    let job = JobBuilder::new(QueueName::PriceGraphSweep, JobType::PriceGraphSweep)
        .payload_json(serde_json::to_value(payload()).unwrap())
        .build();
    let outcome = sweep.handle_job(&job).await.unwrap();

    assert_eq!(outcome.rows_inserted, 1);
    assert_eq!(outcome.errors, 0);
    let baseline = store.refresh_route_baseline("JFK", "LAX").await.unwrap();
    assert_eq!(baseline.sample_count, 1);
}

#[tokio::test]
async fn a_canceled_job_stops_before_its_next_tuple() {
    let (provider, _store, queue, sweep) = harness();
    provider.push_price_graph(vec![PriceGraphPoint {
        start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        return_date: None,
        price: 199.0,
    }]);

    let job = JobBuilder::new(QueueName::PriceGraphSweep, JobType::PriceGraphSweep)
        .payload_json(serde_json::to_value(payload()).unwrap())
        .build();
    queue.cancel(&job.id).await.unwrap();
    let outcome = sweep.handle_job(&job).await.unwrap();

    assert!(outcome.canceled);
    assert_eq!(outcome.rows_inserted, 0);
}

#[tokio::test]
async fn a_failed_provider_call_counts_as_one_error_and_zero_rows() {
    let (provider, _store, _queue, sweep) = harness();
    provider.push_price_graph_error(fj_provider::ProviderError::Upstream("down".to_string()));

    let job = JobBuilder::new(QueueName::PriceGraphSweep, JobType::PriceGraphSweep)
        .payload_json(serde_json::to_value(payload()).unwrap())
        .build();
    let outcome = sweep.handle_job(&job).await.unwrap();

    assert_eq!(outcome.rows_inserted, 0);
    assert_eq!(outcome.errors, 1);
    assert_eq!(outcome.status(), SweepStatus::Failed);
}
