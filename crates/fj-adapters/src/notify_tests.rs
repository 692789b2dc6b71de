use super::*;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;

#[derive(Default)]
struct RecordingNotifier {
    events: Arc<SyncMutex<Vec<NotifyEvent>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotifyEvent) {
        self.events.lock().push(event);
    }
}

#[tokio::test]
async fn log_notifier_accepts_every_kind() {
    let notifier = LogNotifier;
    for kind in [
        NotifyKind::Stall,
        NotifyKind::ErrorSpike,
        NotifyKind::RateLimited,
        NotifyKind::SweepLifecycle,
    ] {
        notifier
            .notify(NotifyEvent {
                kind,
                subject: "JFK-LAX".to_string(),
                message: "test".to_string(),
            })
            .await;
    }
}

#[tokio::test]
async fn rate_limited_notifier_suppresses_identical_alert_within_cooldown() {
    let events = Arc::new(SyncMutex::new(Vec::new()));
    let inner = RecordingNotifier { events: Arc::clone(&events) };
    let notifier = RateLimitedNotifier::with_cooldown(inner, Duration::from_secs(300));

    for _ in 0..3 {
        notifier
            .notify(NotifyEvent {
                kind: NotifyKind::Stall,
                subject: "JFK-LAX".to_string(),
                message: "stalled".to_string(),
            })
            .await;
    }

    assert_eq!(events.lock().len(), 1);
}

#[tokio::test]
async fn rate_limited_notifier_treats_distinct_subjects_independently() {
    let events = Arc::new(SyncMutex::new(Vec::new()));
    let inner = RecordingNotifier { events: Arc::clone(&events) };
    let notifier = RateLimitedNotifier::with_cooldown(inner, Duration::from_secs(300));

    notifier
        .notify(NotifyEvent {
            kind: NotifyKind::Stall,
            subject: "JFK-LAX".to_string(),
            message: "stalled".to_string(),
        })
        .await;
    notifier
        .notify(NotifyEvent {
            kind: NotifyKind::Stall,
            subject: "LHR-CDG".to_string(),
            message: "stalled".to_string(),
        })
        .await;

    assert_eq!(events.lock().len(), 2);
}

#[tokio::test]
async fn rate_limited_notifier_treats_distinct_kinds_independently() {
    let events = Arc::new(SyncMutex::new(Vec::new()));
    let inner = RecordingNotifier { events: Arc::clone(&events) };
    let notifier = RateLimitedNotifier::with_cooldown(inner, Duration::from_secs(300));

    notifier
        .notify(NotifyEvent {
            kind: NotifyKind::Stall,
            subject: "JFK-LAX".to_string(),
            message: "stalled".to_string(),
        })
        .await;
    notifier
        .notify(NotifyEvent {
            kind: NotifyKind::ErrorSpike,
            subject: "JFK-LAX".to_string(),
            message: "errors spiking".to_string(),
        })
        .await;

    assert_eq!(events.lock().len(), 2);
}

#[tokio::test]
async fn rate_limited_notifier_sends_again_after_cooldown_elapses() {
    let events = Arc::new(SyncMutex::new(Vec::new()));
    let inner = RecordingNotifier { events: Arc::clone(&events) };
    let notifier = RateLimitedNotifier::with_cooldown(inner, Duration::from_millis(10));

    notifier
        .notify(NotifyEvent {
            kind: NotifyKind::Stall,
            subject: "JFK-LAX".to_string(),
            message: "stalled".to_string(),
        })
        .await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    notifier
        .notify(NotifyEvent {
            kind: NotifyKind::Stall,
            subject: "JFK-LAX".to_string(),
            message: "stalled again".to_string(),
        })
        .await;

    assert_eq!(events.lock().len(), 2);
}
