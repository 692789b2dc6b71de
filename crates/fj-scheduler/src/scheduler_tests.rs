use super::*;
use crate::fake::InMemoryScheduledJobStore;
use crate::types::ScheduledRouteSpec;
use chrono::{TimeZone, Utc};
use fj_core::{CabinClass, FakeClock, StopsPreference, TripType};
use fj_queue::fake::InMemoryQueueStore;
use fj_queue::store::JobListState;
use std::collections::HashSet;

fn route() -> ScheduledRouteSpec {
    ScheduledRouteSpec {
        origins: vec!["JFK".to_string()],
        destinations: vec!["LAX".to_string(), "SFO".to_string()],
        departure_offset_days: 7,
        window_days: 14,
        trip_length_days: Some(7),
        trip_type: TripType::RoundTrip,
        cabin: CabinClass::Economy,
        stops: StopsPreference::Any,
        travelers: 2,
        currency: "USD".to_string(),
        excluded_airlines: HashSet::new(),
    }
}

fn harness(
    at: chrono::DateTime<Utc>,
) -> (
    Arc<InMemoryQueueStore<FakeClock>>,
    Arc<InMemoryScheduledJobStore>,
    Scheduler<InMemoryQueueStore<FakeClock>, InMemoryScheduledJobStore, FakeClock>,
) {
    let clock = FakeClock::new(at);
    let queue = Arc::new(InMemoryQueueStore::with_clock(clock.clone(), Duration::from_secs(45)));
    let store = Arc::new(InMemoryScheduledJobStore::new());
    let scheduler = Scheduler::new(Arc::clone(&queue), Arc::clone(&store), clock);
    (queue, store, scheduler)
}

#[tokio::test]
async fn fires_daily_job_exactly_at_its_configured_minute() {
    let fire_time = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let (queue, store, scheduler) = harness(fire_time);
    store
        .upsert(ScheduledJobDef {
            id: "job-1".to_string(),
            name: "morning sweep".to_string(),
            schedule: "daily at 06:00".to_string(),
            enabled: true,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();

    scheduler.refresh().await.unwrap();
    let fired = scheduler.tick().await;
    assert_eq!(fired, vec!["job-1".to_string()]);

    let jobs = queue.list_jobs(QueueName::BulkSearch, JobListState::Pending, 10, 0).await.unwrap();
    assert_eq!(jobs.len(), 1);

    let def = store
        .list_enabled()
        .await
        .unwrap()
        .into_iter()
        .find(|d| d.id == "job-1")
        .unwrap();
    assert_eq!(def.last_run, Some(fire_time));
}

#[tokio::test]
async fn does_not_fire_when_minute_does_not_match() {
    let off_minute = Utc.with_ymd_and_hms(2026, 3, 1, 6, 1, 0).unwrap();
    let (queue, store, scheduler) = harness(off_minute);
    store
        .upsert(ScheduledJobDef {
            id: "job-1".to_string(),
            name: "morning sweep".to_string(),
            schedule: "daily at 06:00".to_string(),
            enabled: true,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();

    scheduler.refresh().await.unwrap();
    let fired = scheduler.tick().await;
    assert!(fired.is_empty());
    let jobs = queue.list_jobs(QueueName::BulkSearch, JobListState::Pending, 10, 0).await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn disabled_jobs_are_never_loaded_into_the_cache() {
    let fire_time = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let (_queue, store, scheduler) = harness(fire_time);
    store
        .upsert(ScheduledJobDef {
            id: "job-1".to_string(),
            name: "disabled".to_string(),
            schedule: "daily at 06:00".to_string(),
            enabled: false,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();

    scheduler.refresh().await.unwrap();
    assert!(scheduler.tick().await.is_empty());
}

#[tokio::test]
async fn unparseable_schedule_is_dropped_without_failing_refresh() {
    let fire_time = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let (_queue, store, scheduler) = harness(fire_time);
    store
        .upsert(ScheduledJobDef {
            id: "bad".to_string(),
            name: "bad".to_string(),
            schedule: "whenever".to_string(),
            enabled: true,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();

    assert!(scheduler.refresh().await.is_ok());
    assert!(scheduler.tick().await.is_empty());
}

#[tokio::test]
async fn register_job_adds_it_to_the_live_cache_without_a_full_refresh() {
    let fire_time = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let (queue, _store, scheduler) = harness(fire_time);

    scheduler
        .register_job(ScheduledJobDef {
            id: "job-2".to_string(),
            name: "added live".to_string(),
            schedule: "daily at 06:00".to_string(),
            enabled: true,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();

    let fired = scheduler.tick().await;
    assert_eq!(fired, vec!["job-2".to_string()]);
    let jobs = queue.list_jobs(QueueName::BulkSearch, JobListState::Pending, 10, 0).await.unwrap();
    assert_eq!(jobs.len(), 1);
}

#[tokio::test]
async fn remove_job_takes_it_out_of_the_cache() {
    let fire_time = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let (_queue, _store, scheduler) = harness(fire_time);
    scheduler
        .register_job(ScheduledJobDef {
            id: "job-3".to_string(),
            name: "removable".to_string(),
            schedule: "daily at 06:00".to_string(),
            enabled: true,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();
    scheduler.remove_job("job-3").await.unwrap();
    assert!(scheduler.tick().await.is_empty());
}

#[tokio::test]
async fn fired_payload_carries_the_configured_route_details() {
    let fire_time = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let (queue, store, scheduler) = harness(fire_time);
    store
        .upsert(ScheduledJobDef {
            id: "job-1".to_string(),
            name: "morning sweep".to_string(),
            schedule: "daily at 06:00".to_string(),
            enabled: true,
            route: route(),
            last_run: None,
        })
        .await
        .unwrap();
    scheduler.refresh().await.unwrap();
    scheduler.tick().await;

    let jobs = queue.list_jobs(QueueName::BulkSearch, JobListState::Pending, 10, 0).await.unwrap();
    let request: BulkSearchRequest = jobs[0].payload_as().unwrap();
    assert_eq!(request.origins, vec!["JFK".to_string()]);
    assert_eq!(request.destinations, vec!["LAX".to_string(), "SFO".to_string()]);
    assert_eq!(request.departure_from, (fire_time.date_naive() + ChronoDuration::days(7)));
}
