mod common;

use chrono::{Duration, TimeZone, Utc};
use common::RecordingObserver;
use headline_watch::telemetry::metrics;
use headline_watch::{FeedItem, RecordStore, RetentionSweeper, SweepReport, TrackedArticle};
use std::sync::Arc;

fn tracked(id: &str, published_at: chrono::DateTime<Utc>) -> TrackedArticle {
    TrackedArticle::from_item(FeedItem::new(id, "Kop", published_at), "Tech")
}

#[test]
fn test_retention_boundary() {
    let observer = Arc::new(RecordingObserver::new());
    let sweeper = RetentionSweeper::with_default_retention(observer.clone());
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 15).unwrap();

    let mut store = RecordStore::new();
    store.insert(tracked("fresh", now - Duration::hours(1)));
    store.insert(tracked("almost", now - (Duration::hours(47) + Duration::minutes(59))));
    store.insert(tracked("expired", now - (Duration::hours(48) + Duration::minutes(1))));
    store.insert(tracked("ancient", now - Duration::days(10)));

    let report = sweeper.sweep(&mut store, now);

    assert_eq!(report, SweepReport { removed: 2, total: 4 });
    assert_eq!(report.remaining(), 2);
    assert_eq!(report.percent_removed(), 50);
    assert!(store.find("fresh", "Tech").is_some());
    assert!(store.find("almost", "Tech").is_some());
    assert!(store.find("expired", "Tech").is_none());
    assert!(store.find("ancient", "Tech").is_none());
    assert_eq!(observer.last_histogram(metrics::COUNT_PURGED), Some(2.0));
}

#[test]
fn test_exact_threshold_survives() {
    let sweeper = RetentionSweeper::with_default_retention(Arc::new(RecordingObserver::new()));
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

    assert!(!sweeper.is_expired(now - Duration::hours(48), now));
    assert!(sweeper.is_expired(now - Duration::hours(48) - Duration::minutes(1), now));
}

#[test]
fn test_empty_store_sweep() {
    let observer = Arc::new(RecordingObserver::new());
    let sweeper = RetentionSweeper::with_default_retention(observer.clone());
    let mut store = RecordStore::new();

    let report = sweeper.sweep(&mut store, Utc::now());

    assert_eq!(report, SweepReport { removed: 0, total: 0 });
    assert_eq!(report.percent_removed(), 0);
    assert_eq!(observer.last_histogram(metrics::COUNT_PURGED), Some(0.0));
}

#[test]
fn test_percent_is_floored() {
    assert_eq!(SweepReport { removed: 1, total: 3 }.percent_removed(), 33);
    assert_eq!(SweepReport { removed: 3, total: 3 }.percent_removed(), 100);
}

#[test]
fn test_custom_retention() {
    let sweeper = RetentionSweeper::new(Duration::hours(1), Arc::new(RecordingObserver::new()));
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    let mut store = RecordStore::new();
    store.insert(tracked("recent", now - Duration::minutes(30)));
    store.insert(tracked("old", now - Duration::hours(2)));

    assert_eq!(sweeper.sweep(&mut store, now).removed, 1);
    assert!(store.find("recent", "Tech").is_some());
}

#[tokio::test]
async fn test_sweep_shared_store() {
    let sweeper = RetentionSweeper::with_default_retention(Arc::new(RecordingObserver::new()));
    let now = Utc::now();
    let store = RecordStore::shared();
    store.write().await.insert(tracked("old", now - Duration::days(3)));

    let report = sweeper.sweep_shared(&store, now).await;

    assert_eq!(report.removed, 1);
    assert!(store.read().await.is_empty());
}
