use super::*;
use crate::heartbeat::{WorkerHeartbeat, WorkerStatus};
use std::time::Duration;

#[tokio::test]
async fn published_heartbeat_is_listed_while_fresh() {
    let registry = InMemoryWorkerRegistry::new();
    let hb = WorkerHeartbeat::starting("w1", "host-a", 4);
    registry
        .publish_heartbeat("fj", &hb, Duration::from_secs(30))
        .await
        .unwrap();

    let live = registry.list_live_workers("fj", Duration::from_secs(60)).await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, "w1");
}

#[tokio::test]
async fn stale_heartbeat_is_excluded_from_liveness_query() {
    let registry = InMemoryWorkerRegistry::new();
    let mut hb = WorkerHeartbeat::starting("w1", "host-a", 4);
    hb.last_heartbeat = chrono::Utc::now() - chrono::Duration::hours(1);
    registry
        .publish_heartbeat("fj", &hb, Duration::from_secs(30))
        .await
        .unwrap();

    let live = registry
        .list_live_workers("fj", Duration::from_secs(60))
        .await
        .unwrap();
    assert!(live.is_empty());
}

#[tokio::test]
async fn get_worker_returns_latest_published_state() {
    let registry = InMemoryWorkerRegistry::new();
    let mut hb = WorkerHeartbeat::starting("w1", "host-a", 4);
    registry.publish_heartbeat("fj", &hb, Duration::from_secs(30)).await.unwrap();
    hb.status = WorkerStatus::Processing;
    hb.processed_jobs = 3;
    registry.publish_heartbeat("fj", &hb, Duration::from_secs(30)).await.unwrap();

    let fetched = registry.get_worker("fj", "w1").await.unwrap().unwrap();
    assert_eq!(fetched.status, WorkerStatus::Processing);
    assert_eq!(fetched.processed_jobs, 3);
}

#[tokio::test]
async fn remove_drops_the_worker() {
    let registry = InMemoryWorkerRegistry::new();
    let hb = WorkerHeartbeat::starting("w1", "host-a", 4);
    registry.publish_heartbeat("fj", &hb, Duration::from_secs(30)).await.unwrap();
    registry.remove("fj", "w1").await.unwrap();
    assert!(registry.get_worker("fj", "w1").await.unwrap().is_none());
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let registry = InMemoryWorkerRegistry::new();
    let hb = WorkerHeartbeat::starting("w1", "host-a", 4);
    registry.publish_heartbeat("ns-a", &hb, Duration::from_secs(30)).await.unwrap();
    assert!(registry.get_worker("ns-b", "w1").await.unwrap().is_none());
}
