// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fj_provider::{FakeFlightsProvider, Leg, PriceRange, ProviderError};
use fj_resultstore::InMemoryResultStore;
use std::collections::HashSet;
use std::time::Duration;

fn payload(departure_from: NaiveDate, departure_to: NaiveDate) -> RoutePayload {
    RoutePayload {
        bulk_search_id: "bs-1".to_string(),
        origin: "JFK".to_string(),
        destination: "LAX".to_string(),
        departure_from,
        departure_to,
        return_from: None,
        return_to: None,
        trip_length_days: Some(7),
        trip_type: fj_core::TripType::RoundTrip,
        cabin: "economy".to_string(),
        stops: "any".to_string(),
        travelers: 1,
        currency: "USD".to_string(),
        excluded_airlines: HashSet::new(),
    }
}

fn leg(flight_number: &str, departure_hour: u32, duration_minutes: u32) -> Leg {
    Leg {
        departure_airport: "JFK".to_string(),
        arrival_airport: "LAX".to_string(),
        city: "Los Angeles".to_string(),
        flight_number: flight_number.to_string(),
        aircraft: "A320".to_string(),
        legroom: None,
        departure_time: chrono::NaiveTime::from_hms_opt(departure_hour, 0, 0).unwrap(),
        arrival_time: chrono::NaiveTime::from_hms_opt((departure_hour + 3) % 24, 0, 0).unwrap(),
        duration_minutes,
    }
}

fn offer(start_date: NaiveDate, return_date: Option<NaiveDate>, price: f64, airline: &str) -> FullOffer {
    FullOffer {
        start_date,
        return_date,
        price,
        currency: "USD".to_string(),
        outbound: vec![leg(&format!("{airline}100"), 10, 180)],
        return_legs: return_date.map(|_| vec![leg(&format!("{airline}200"), 14, 180)]).unwrap_or_default(),
    }
}

fn harness() -> (
    Arc<FakeFlightsProvider>,
    Arc<InMemoryResultStore>,
    RouteWorker<FakeFlightsProvider, InMemoryResultStore>,
) {
    let provider = Arc::new(FakeFlightsProvider::new());
    let store = Arc::new(InMemoryResultStore::new());
    let worker = RouteWorker::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        3,
        Duration::from_secs(5),
    );
    (provider, store, worker)
}

/// spec.md §8 scenario 2: single-date request issues exactly one
/// get_offers call and no price-graph call.
#[tokio::test]
async fn single_date_request_skips_the_price_graph_phase() {
    let (provider, store, worker) = harness();
    let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let return_date = date + chrono::Duration::days(7);
    provider.push_offers(
        vec![offer(date, Some(return_date), 250.0, "AA")],
        PriceRange { min: 250.0, max: 250.0 },
    );

    store
        .create_bulk_search(fj_resultstore::BulkSearchRecord::new("bs-1", 1, "USD"))
        .await
        .unwrap();
    worker.process_route(payload(date, date)).await;

    assert_eq!(provider.price_graph_call_count(), 0);
    assert_eq!(provider.offers_call_count(), 1);
    let offers = store.offers_for("bs-1");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].price, 250.0);

    let record = store.get_bulk_search("bs-1").await.unwrap();
    assert_eq!(record.completed, 1);
    assert_eq!(record.status, fj_resultstore::BulkSearchStatus::Completed);
}

/// spec.md §8 scenario 1: a date-range request runs the two-phase
/// cheap-first algorithm, only calling get_offers for the cheapest
/// top-N dates from the price graph.
#[tokio::test]
async fn date_range_request_only_fetches_offers_for_the_cheapest_dates() {
    let (provider, store, worker) = harness();
    let d = |day: u32| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
    provider.push_price_graph(vec![
        fj_provider::PriceGraphPoint {
            start_date: d(1),
            return_date: Some(d(8)),
            price: 500.0,
        },
        fj_provider::PriceGraphPoint {
            start_date: d(2),
            return_date: Some(d(9)),
            price: 200.0,
        },
        fj_provider::PriceGraphPoint {
            start_date: d(3),
            return_date: Some(d(10)),
            price: 300.0,
        },
        fj_provider::PriceGraphPoint {
            start_date: d(4),
            return_date: Some(d(11)),
            price: 999.0,
        },
    ]);
    provider.push_offers(
        vec![offer(d(2), Some(d(9)), 200.0, "AA")],
        PriceRange { min: 200.0, max: 200.0 },
    );

    store
        .create_bulk_search(fj_resultstore::BulkSearchRecord::new("bs-1", 1, "USD"))
        .await
        .unwrap();
    worker.process_route(payload(d(1), d(14))).await;

    assert_eq!(provider.price_graph_call_count(), 1);
    // top_n=3: the 999.0 point never gets a get_offers call.
    assert_eq!(provider.offers_call_count(), 3);
    let calls = provider.offers_calls();
    assert!(calls.iter().all(|c| c.departure != d(4)));
}

#[tokio::test]
async fn unsafe_prices_are_filtered_before_ranking() {
    let (provider, store, worker) = harness();
    let d = |day: u32| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
    provider.push_price_graph(vec![
        fj_provider::PriceGraphPoint {
            start_date: d(1),
            return_date: Some(d(8)),
            price: -5.0,
        },
        fj_provider::PriceGraphPoint {
            start_date: d(2),
            return_date: Some(d(9)),
            price: 400.0,
        },
    ]);
    provider.push_offers(
        vec![offer(d(2), Some(d(9)), 400.0, "AA")],
        PriceRange { min: 400.0, max: 400.0 },
    );

    store
        .create_bulk_search(fj_resultstore::BulkSearchRecord::new("bs-1", 1, "USD"))
        .await
        .unwrap();
    worker.process_route(payload(d(1), d(14))).await;

    assert_eq!(provider.offers_call_count(), 1);
    let calls = provider.offers_calls();
    assert_eq!(calls[0].departure, d(2));
}

#[tokio::test]
async fn excluded_airlines_are_dropped_before_scoring() {
    let (provider, store, worker) = harness();
    let d = |day: u32| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
    provider.push_offers(
        vec![
            offer(d(1), Some(d(8)), 150.0, "UA"),
            offer(d(1), Some(d(8)), 200.0, "AA"),
        ],
        PriceRange { min: 150.0, max: 200.0 },
    );

    store
        .create_bulk_search(fj_resultstore::BulkSearchRecord::new("bs-1", 1, "USD"))
        .await
        .unwrap();

    let mut p = payload(d(1), d(1));
    p.excluded_airlines.insert("UA".to_string());
    worker.process_route(p).await;

    let offers = store.offers_for("bs-1");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].airline_code.as_deref(), Some("AA"));
}

/// An erroring provider still advances progress and finalizes, just
/// with no offer persisted and the error counted (spec.md §4.5
/// "Error policy inside a route worker").
#[tokio::test]
async fn provider_errors_still_advance_progress_and_finalize() {
    let (provider, store, worker) = harness();
    let d = |day: u32| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
    provider.push_offers_error(ProviderError::Upstream("scraper unavailable".to_string()));

    store
        .create_bulk_search(fj_resultstore::BulkSearchRecord::new("bs-1", 1, "USD"))
        .await
        .unwrap();
    worker.process_route(payload(d(1), d(1))).await;

    let record = store.get_bulk_search("bs-1").await.unwrap();
    assert_eq!(record.completed, 1);
    assert_eq!(record.stats.error_count, 1);
    assert_eq!(record.status, fj_resultstore::BulkSearchStatus::Failed);
    assert!(store.offers_for("bs-1").is_empty());
}

/// Multiple routes finalize exactly once, only once the last one
/// completes (spec.md §9).
#[tokio::test]
async fn finalize_only_fires_once_all_routes_have_completed() {
    let (provider, store, worker) = harness();
    let d = |day: u32| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
    provider.push_offers(
        vec![offer(d(1), Some(d(8)), 300.0, "AA")],
        PriceRange { min: 300.0, max: 300.0 },
    );

    store
        .create_bulk_search(fj_resultstore::BulkSearchRecord::new("bs-1", 2, "USD"))
        .await
        .unwrap();
    worker.process_route(payload(d(1), d(1))).await;
    let mid = store.get_bulk_search("bs-1").await.unwrap();
    assert_eq!(mid.status, fj_resultstore::BulkSearchStatus::Queued);

    worker.process_route(payload(d(1), d(1))).await;
    let done = store.get_bulk_search("bs-1").await.unwrap();
    assert_eq!(done.completed, 2);
    assert_eq!(done.status, fj_resultstore::BulkSearchStatus::Completed);
}
