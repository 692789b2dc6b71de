//! spec.md §4.4 `flight_search` jobs: a single-route, single-date lookup
//! enqueued directly rather than fanned out by `BulkCoordinator`.
//! `FlightSearchWorker` wraps itself in an ad-hoc one-route bulk search
//! record and calls straight into `RouteWorker::process_route` (no
//! separate `bulk_search_route` job round-trips through the queue).

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use fj_bulk::{FlightSearchWorker, RouteWorker};
use fj_core::id::IdGen;
use fj_core::job::{EnqueueMeta, Job, JobId, JobType, QueueName};
use fj_core::{CabinClass, FlightSearchRequest, SequentialIdGen, StopsPreference, TripType};
use fj_provider::{FakeFlightsProvider, FullOffer, Leg, PriceRange};
use fj_resultstore::{BulkSearchStatus, InMemoryResultStore, ResultStore};

fn leg(flight_number: &str, hour: u32) -> Leg {
    Leg {
        departure_airport: "SFO".to_string(),
        arrival_airport: "NRT".to_string(),
        city: "Tokyo".to_string(),
        flight_number: flight_number.to_string(),
        aircraft: "777".to_string(),
        legroom: None,
        departure_time: chrono::NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        arrival_time: chrono::NaiveTime::from_hms_opt((hour + 10) % 24, 0, 0).unwrap(),
        duration_minutes: 600,
    }
}

fn offer(date: NaiveDate, price: f64) -> FullOffer {
    FullOffer {
        start_date: date,
        return_date: Some(date + chrono::Duration::days(10)),
        price,
        currency: "USD".to_string(),
        outbound: vec![leg("UA800", 11)],
        return_legs: vec![leg("UA801", 17)],
    }
}

fn job_for(request: &FlightSearchRequest) -> Job {
    Job {
        id: JobId::new("job-1"),
        job_type: JobType::FlightSearch,
        queue: QueueName::FlightSearch,
        payload: serde_json::to_vec(request).unwrap(),
        enqueued_at: chrono::Utc::now(),
        meta: EnqueueMeta::for_actor("test"),
        attempts: 1,
    }
}

#[tokio::test]
async fn single_route_search_persists_one_offer_and_completes() {
    let store = Arc::new(InMemoryResultStore::new());
    let provider = Arc::new(FakeFlightsProvider::new());
    let route_worker = RouteWorker::new(Arc::clone(&provider), Arc::clone(&store), 3, Duration::from_secs(5));
    let id_gen: Arc<dyn IdGen> = Arc::new(SequentialIdGen::new("bs"));
    let worker = FlightSearchWorker::new(route_worker, Arc::clone(&store), Arc::clone(&id_gen));

    let departure = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let request = FlightSearchRequest {
        origin: "SFO".to_string(),
        destination: "NRT".to_string(),
        departure_date: departure,
        return_date: Some(departure + chrono::Duration::days(10)),
        trip_type: TripType::RoundTrip,
        cabin: CabinClass::Economy,
        stops: StopsPreference::Any,
        travelers: 1,
        currency: "USD".to_string(),
        excluded_airlines: Default::default(),
    };

    provider.push_offers(vec![offer(departure, 899.0)], PriceRange { min: 800.0, max: 1000.0 });

    let job = job_for(&request);
    worker.handle_job(&job).await.unwrap();

    // FlightSearchWorker generates its own bulk_search_id (SequentialIdGen
    // counts from 1); the record it created is the only one in the store.
    let record = store.get_bulk_search("bs-1").await.unwrap();
    assert_eq!(record.total_searches, 1);
    assert_eq!(record.completed, 1);
    assert_eq!(record.status, BulkSearchStatus::Completed);
    assert_eq!(record.stats.total_offers, 1);
    assert_eq!(record.stats.min_price, Some(899.0));
}

#[tokio::test]
async fn one_way_trip_carries_no_trip_length_and_still_completes() {
    let store = Arc::new(InMemoryResultStore::new());
    let provider = Arc::new(FakeFlightsProvider::new());
    let route_worker = RouteWorker::new(Arc::clone(&provider), Arc::clone(&store), 3, Duration::from_secs(5));
    let id_gen: Arc<dyn IdGen> = Arc::new(SequentialIdGen::new("bs"));
    let worker = FlightSearchWorker::new(route_worker, Arc::clone(&store), Arc::clone(&id_gen));

    let departure = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let request = FlightSearchRequest {
        origin: "SFO".to_string(),
        destination: "NRT".to_string(),
        departure_date: departure,
        return_date: None,
        trip_type: TripType::OneWay,
        cabin: CabinClass::Economy,
        stops: StopsPreference::Nonstop,
        travelers: 2,
        currency: "USD".to_string(),
        excluded_airlines: Default::default(),
    };

    // No canned offers: FakeFlightsProvider returns empty, matching the
    // "no usable price" boundary case fan_out.rs exercises for route jobs.
    let job = job_for(&request);
    worker.handle_job(&job).await.unwrap();

    let record = store.get_bulk_search("bs-1").await.unwrap();
    assert_eq!(record.completed, 1);
    assert_eq!(record.status, BulkSearchStatus::Failed);
}
