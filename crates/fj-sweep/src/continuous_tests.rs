// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fj_core::FakeClock;
use fj_provider::FakeFlightsProvider;
use fj_queue::fake::InMemoryQueueStore;
use fj_resultstore::InMemoryResultStore;

fn route(origin: &str, destination: &str) -> Route {
    Route {
        origin: origin.to_string(),
        destination: destination.to_string(),
    }
}

fn config() -> ContinuousSweepConfigSnapshot {
    ContinuousSweepConfigSnapshot {
        trip_lengths_days: vec![7, 14],
        pacing_mode: PacingMode::Fixed,
        target_duration_hours: 24.0,
        min_delay_ms: 0,
        international_only: false,
    }
}

async fn harness(
    routes: Vec<Route>,
) -> (
    Arc<InMemoryResultStore>,
    Arc<InMemoryQueueStore>,
    ContinuousSweep<InMemoryQueueStore, InMemoryResultStore, FakeClock>,
) {
    let store = Arc::new(InMemoryResultStore::new());
    let queue = Arc::new(InMemoryQueueStore::new());
    let clock = FakeClock::default();
    let sweep = ContinuousSweep::new(
        Arc::clone(&queue),
        Arc::clone(&store),
        clock,
        routes,
        config(),
        ContinuousSweepQueryDefaults::default(),
    )
    .await
    .unwrap();
    (store, queue, sweep)
}

#[tokio::test]
async fn starts_stopped_and_transitions_to_running_then_back() {
    let (_store, _queue, sweep) = harness(vec![route("JFK", "LAX")]).await;
    assert_eq!(sweep.snapshot().state, SweepState::Stopped);

    let sweep = Arc::new(sweep);
    sweep.start();
    tokio::task::yield_now().await;
    assert_eq!(sweep.snapshot().state, SweepState::Running);

    sweep.stop().await;
    assert_eq!(sweep.snapshot().state, SweepState::Stopped);
}

#[tokio::test]
async fn pause_then_resume_round_trips_through_paused() {
    let (_store, _queue, sweep) = harness(vec![route("JFK", "LAX")]).await;
    let sweep = Arc::new(sweep);
    sweep.start();
    tokio::task::yield_now().await;

    sweep.pause();
    assert_eq!(sweep.snapshot().state, SweepState::Paused);

    sweep.resume();
    assert_eq!(sweep.snapshot().state, SweepState::Running);
    sweep.stop().await;
}

#[tokio::test]
async fn emit_price_graph_jobs_enqueues_one_job_per_trip_length() {
    let (_store, queue, sweep) = harness(vec![route("JFK", "LAX")]).await;
    sweep.emit_price_graph_jobs(&route("JFK", "LAX")).await.unwrap();

    let stats = queue.get_queue_stats(QueueName::ContinuousPriceGraph).await.unwrap();
    assert_eq!(stats.pending, 2);
}

#[tokio::test]
async fn complete_sweep_resets_counters_and_bumps_sweep_number() {
    let (store, _queue, sweep) = harness(vec![route("JFK", "LAX"), route("SFO", "NRT")]).await;
    {
        let mut progress = sweep.progress.lock();
        progress.route_index = 2;
        progress.queries_completed = 4;
        progress.error_count = 1;
    }

    sweep.complete_sweep().await.unwrap();

    let progress = sweep.progress();
    assert_eq!(progress.sweep_number, 2);
    assert_eq!(progress.route_index, 0);
    assert_eq!(progress.queries_completed, 0);
    assert_eq!(progress.error_count, 0);

    let persisted = store.get_continuous_sweep_progress().await.unwrap().unwrap();
    assert_eq!(persisted.sweep_number, 2);
}

#[tokio::test]
async fn restoring_progress_with_changed_international_only_resets_the_cursor() {
    let store = Arc::new(InMemoryResultStore::new());
    let queue = Arc::new(InMemoryQueueStore::new());
    let clock = FakeClock::default();

    let mut stale = ContinuousSweepProgress::new(1, config());
    stale.route_index = 5;
    stale.config.international_only = true;
    store.save_continuous_sweep_progress(stale).await.unwrap();

    let routes = vec![route("JFK", "LAX"), route("SFO", "NRT")];
    let sweep = ContinuousSweep::new(
        Arc::clone(&queue),
        Arc::clone(&store),
        clock,
        routes,
        config(),
        ContinuousSweepQueryDefaults::default(),
    )
    .await
    .unwrap();

    let progress = sweep.progress();
    assert_eq!(progress.route_index, 0);
    assert_eq!(progress.total_routes, 2);
}

#[tokio::test]
async fn restoring_progress_with_unchanged_international_only_keeps_the_cursor() {
    let store = Arc::new(InMemoryResultStore::new());
    let queue = Arc::new(InMemoryQueueStore::new());
    let clock = FakeClock::default();

    let mut existing = ContinuousSweepProgress::new(2, config());
    existing.route_index = 1;
    store.save_continuous_sweep_progress(existing).await.unwrap();

    let routes = vec![route("JFK", "LAX"), route("SFO", "NRT")];
    let sweep = ContinuousSweep::new(
        Arc::clone(&queue),
        Arc::clone(&store),
        clock,
        routes,
        config(),
        ContinuousSweepQueryDefaults::default(),
    )
    .await
    .unwrap();

    assert_eq!(sweep.progress().route_index, 1);
}

#[tokio::test]
async fn calculate_delay_fixed_mode_uses_min_delay_ms() {
    let (_store, _queue, sweep) = harness(vec![route("JFK", "LAX")]).await;
    let mut cfg = config();
    cfg.pacing_mode = PacingMode::Fixed;
    cfg.min_delay_ms = 500;
    assert_eq!(sweep.calculate_delay(&cfg), StdDuration::from_millis(500));
}

#[tokio::test]
async fn calculate_delay_adaptive_mode_never_goes_below_min_delay_ms() {
    let (_store, _queue, sweep) = harness(vec![route("JFK", "LAX")]).await;
    let mut cfg = config();
    cfg.pacing_mode = PacingMode::Adaptive;
    cfg.target_duration_hours = 0.0;
    cfg.min_delay_ms = 250;
    assert_eq!(sweep.calculate_delay(&cfg), StdDuration::from_millis(250));
}

#[tokio::test]
async fn pause_and_auto_resume_flips_paused_immediately() {
    let (_store, _queue, sweep) = harness(vec![route("JFK", "LAX")]).await;
    let sweep = Arc::new(sweep);
    sweep.start();
    tokio::task::yield_now().await;

    sweep.pause_and_auto_resume_after_queue_drain(QueueName::BulkSearch);
    assert_eq!(sweep.snapshot().state, SweepState::Paused);
    sweep.stop().await;
}

#[tokio::test]
async fn continuous_price_graph_worker_acks_without_processing_when_control_flag_disabled() {
    let provider = Arc::new(FakeFlightsProvider::new());
    let store = Arc::new(InMemoryResultStore::new());
    let queue = Arc::new(InMemoryQueueStore::new());
    queue
        .set_continuous_sweep_control_flags(fj_queue::ContinuousSweepControlFlags {
            is_running: false,
            is_paused: false,
        })
        .await
        .unwrap();
    let worker = ContinuousPriceGraphWorker::new(Arc::clone(&provider), Arc::clone(&store), Arc::clone(&queue));

    let payload = ContinuousPriceGraphPayload {
        origin: "JFK".to_string(),
        destination: "LAX".to_string(),
        trip_length_days: 7,
        departure_from: chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        departure_to: chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        cabin: CabinClass::Economy,
        stops: StopsPreference::Any,
        travelers: 1,
        currency: "USD".to_string(),
        excluded_airlines: HashSet::new(),
    };
    let job = fj_core::test_support::JobBuilder::new(QueueName::ContinuousPriceGraph, fj_core::JobType::ContinuousPriceGraph)
        .payload_json(serde_json::to_value(payload).unwrap())
        .build();

    worker.handle_job(&job).await.unwrap();
    assert_eq!(provider.price_graph_call_count(), 0);
}
