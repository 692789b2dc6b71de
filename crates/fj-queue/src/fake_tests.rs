use super::*;
use fj_core::clock::FakeClock;
use fj_core::job::QueueName;
use std::time::Duration;

fn store() -> InMemoryQueueStore<FakeClock> {
    InMemoryQueueStore::with_clock(FakeClock::default(), Duration::from_millis(50))
}

#[tokio::test]
async fn enqueue_then_dequeue_round_trips_payload() {
    let store = InMemoryQueueStore::new();
    let id = store
        .enqueue(
            QueueName::BulkSearch,
            b"hello".to_vec(),
            EnqueueMeta::for_actor("alice"),
        )
        .await
        .unwrap();
    let job = store
        .dequeue(QueueName::BulkSearch, Duration::from_millis(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.id, id);
    assert_eq!(job.payload, b"hello");
    assert_eq!(job.meta.actor, "alice");
}

#[tokio::test]
async fn empty_queue_dequeue_returns_none_without_error() {
    let store = InMemoryQueueStore::new();
    let job = store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap();
    assert!(job.is_none());
}

#[tokio::test]
async fn two_consumers_never_receive_the_same_job() {
    let store = InMemoryQueueStore::new();
    for _ in 0..5 {
        store
            .enqueue(QueueName::FlightSearch, vec![], EnqueueMeta::for_actor("a"))
            .await
            .unwrap();
    }
    let mut seen = std::collections::HashSet::new();
    for _ in 0..5 {
        let job = store
            .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
            .await
            .unwrap()
            .unwrap();
        assert!(seen.insert(job.id));
    }
}

#[tokio::test]
async fn ack_is_terminal_no_future_dequeue_returns_it() {
    let store = InMemoryQueueStore::new();
    let id = store
        .enqueue(QueueName::FlightSearch, vec![], EnqueueMeta::for_actor("a"))
        .await
        .unwrap();
    let job = store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.id, id);
    store.ack(QueueName::FlightSearch, &id).await.unwrap();

    // Nothing left pending, and visibility timeout won't resurrect an acked job.
    let next = store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn ack_unknown_id_is_not_an_error() {
    let store = InMemoryQueueStore::new();
    store
        .ack(QueueName::FlightSearch, &JobId::new("does-not-exist"))
        .await
        .unwrap();
}

#[tokio::test]
async fn nack_returns_job_to_pending_for_redelivery() {
    let store = InMemoryQueueStore::new();
    let id = store
        .enqueue(QueueName::FlightSearch, vec![], EnqueueMeta::for_actor("a"))
        .await
        .unwrap();
    store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap();
    store.nack(QueueName::FlightSearch, &id, 5).await.unwrap();

    let redelivered = store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(redelivered.id, id);
}

#[tokio::test]
async fn nack_after_max_attempts_moves_to_dead_letter() {
    let store = InMemoryQueueStore::new();
    let id = store
        .enqueue(QueueName::FlightSearch, vec![], EnqueueMeta::for_actor("a"))
        .await
        .unwrap();

    for _ in 0..5 {
        store
            .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
            .await
            .unwrap();
        store.nack(QueueName::FlightSearch, &id, 5).await.unwrap();
    }

    let stats = store.get_queue_stats(QueueName::FlightSearch).await.unwrap();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pending, 0);
}

#[tokio::test]
async fn expired_visibility_timeout_reclaims_job_to_pending() {
    let clock = FakeClock::default();
    let store = InMemoryQueueStore::with_clock(clock.clone(), Duration::from_millis(100));
    let id = store
        .enqueue(QueueName::FlightSearch, vec![], EnqueueMeta::for_actor("a"))
        .await
        .unwrap();
    store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap();

    // Not yet expired.
    let stats = store.get_queue_stats(QueueName::FlightSearch).await.unwrap();
    assert_eq!(stats.processing, 1);

    clock.advance(Duration::from_millis(200));
    let reclaimed = store
        .dequeue(QueueName::FlightSearch, Duration::from_millis(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reclaimed.id, id);
}

#[tokio::test]
async fn cancel_flag_is_observable_and_not_set_by_default() {
    let store = InMemoryQueueStore::new();
    let id = JobId::new("job-1");
    assert!(!store.is_canceled(&id).await.unwrap());
    store.cancel(&id).await.unwrap();
    assert!(store.is_canceled(&id).await.unwrap());
}

#[tokio::test]
async fn enqueue_metrics_aggregate_by_actor_within_window() {
    let store = store();
    for _ in 0..3 {
        store
            .enqueue(QueueName::BulkSearch, vec![], EnqueueMeta::for_actor("alice"))
            .await
            .unwrap();
    }
    store
        .enqueue(QueueName::BulkSearch, vec![], EnqueueMeta::for_actor("bob"))
        .await
        .unwrap();

    let metrics = store
        .get_enqueue_metrics(QueueName::BulkSearch, 5)
        .await
        .unwrap();
    assert_eq!(metrics.get("alice"), Some(&3));
    assert_eq!(metrics.get("bob"), Some(&1));
}

#[tokio::test]
async fn control_flags_default_to_running_and_unpaused() {
    let store = InMemoryQueueStore::new();
    let flags = store.get_continuous_sweep_control_flags().await.unwrap();
    assert!(flags.is_running);
    assert!(!flags.is_paused);

    store
        .set_continuous_sweep_control_flags(Some(false), None)
        .await
        .unwrap();
    let flags = store.get_continuous_sweep_control_flags().await.unwrap();
    assert!(!flags.is_running);
    assert!(!flags.is_paused);
}
