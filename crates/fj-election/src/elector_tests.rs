use super::*;
use crate::fake_backend::InMemoryLockBackend;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::time::Duration;

fn counters() -> (Arc<AtomicU32>, Arc<AtomicU32>) {
    (Arc::new(AtomicU32::new(0)), Arc::new(AtomicU32::new(0)))
}

#[tokio::test]
async fn acquire_on_vacant_key_becomes_leader_and_fires_callback_once() {
    let backend = Arc::new(InMemoryLockBackend::new());
    let (became, lost) = counters();
    let became2 = became.clone();
    let elector = LeaderElector::new(
        "lock",
        "instance-a",
        Duration::from_millis(100),
        backend,
        move || {
            became2.fetch_add(1, AtomicOrdering::SeqCst);
        },
        move || {},
    );

    assert!(elector.acquire().await.unwrap());
    assert!(elector.is_leader());
    assert_eq!(became.load(AtomicOrdering::SeqCst), 1);

    // Calling acquire again while already leader does not re-fire.
    assert!(elector.acquire().await.unwrap());
    assert_eq!(became.load(AtomicOrdering::SeqCst), 1);
    let _ = lost;
}

#[tokio::test]
async fn second_instance_cannot_acquire_while_first_holds_lock() {
    let backend = Arc::new(InMemoryLockBackend::new());
    let a = LeaderElector::new(
        "lock",
        "instance-a",
        Duration::from_secs(10),
        backend.clone(),
        || {},
        || {},
    );
    let b = LeaderElector::new(
        "lock",
        "instance-b",
        Duration::from_secs(10),
        backend,
        || {},
        || {},
    );

    assert!(a.acquire().await.unwrap());
    assert!(!b.acquire().await.unwrap());
    assert!(a.is_leader());
    assert!(!b.is_leader());
}

#[tokio::test]
async fn renew_fails_and_fires_on_lose_leader_exactly_once_when_lock_stolen() {
    let backend = Arc::new(InMemoryLockBackend::new());
    let (_, lost) = counters();
    let lost2 = lost.clone();
    let elector = LeaderElector::new(
        "lock",
        "instance-a",
        Duration::from_millis(100),
        backend.clone(),
        || {},
        move || {
            lost2.fetch_add(1, AtomicOrdering::SeqCst);
        },
    );

    assert!(elector.acquire().await.unwrap());

    // Force-expire by overwriting the key with another value, as in
    // spec.md §8 scenario 4.
    backend.force_set("lock", "other", Duration::from_secs(10));

    assert!(!elector.renew().await.unwrap());
    assert!(!elector.is_leader());
    assert_eq!(lost.load(AtomicOrdering::SeqCst), 1);

    // Renewing again while already a follower does not re-fire.
    assert!(!elector.renew().await.unwrap());
    assert_eq!(lost.load(AtomicOrdering::SeqCst), 1);
}

#[tokio::test]
async fn reacquire_after_losing_leadership_fires_on_become_leader_again() {
    let backend = Arc::new(InMemoryLockBackend::new());
    let (became, lost) = counters();
    let became2 = became.clone();
    let lost2 = lost.clone();
    let elector = LeaderElector::new(
        "lock",
        "instance-a",
        Duration::from_millis(50),
        backend.clone(),
        move || {
            became2.fetch_add(1, AtomicOrdering::SeqCst);
        },
        move || {
            lost2.fetch_add(1, AtomicOrdering::SeqCst);
        },
    );

    assert!(elector.acquire().await.unwrap());
    backend.force_clear("lock");
    assert!(!elector.renew().await.unwrap());
    assert_eq!(lost.load(AtomicOrdering::SeqCst), 1);

    assert!(elector.acquire().await.unwrap());
    assert_eq!(became.load(AtomicOrdering::SeqCst), 2);
}

#[tokio::test]
async fn release_clears_leadership_and_the_backend_key() {
    let backend = Arc::new(InMemoryLockBackend::new());
    let elector = LeaderElector::new(
        "lock",
        "instance-a",
        Duration::from_secs(10),
        backend.clone(),
        || {},
        || {},
    );
    elector.acquire().await.unwrap();
    assert!(elector.release().await.unwrap());
    assert!(!elector.is_leader());

    let other = LeaderElector::new(
        "lock",
        "instance-b",
        Duration::from_secs(10),
        backend,
        || {},
        || {},
    );
    assert!(other.acquire().await.unwrap());
}

#[test]
fn instance_id_embeds_hostname_and_is_unique() {
    let a = instance_id("host-1");
    let b = instance_id("host-1");
    assert!(a.starts_with("host-1-"));
    assert_ne!(a, b);
}
