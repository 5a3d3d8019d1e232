use crate::store::{RecordStore, SharedStore};
use crate::telemetry::{metrics, Observer};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RETENTION_HOURS: i64 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub total: usize,
}

impl SweepReport {
    pub fn remaining(&self) -> usize {
        self.total - self.removed
    }

    /// Share of the pre-sweep records that were removed, floored. An empty
    /// store reports 0.
    pub fn percent_removed(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.removed as u64 * 100) / self.total as u64
    }
}

/// Evicts articles published before the retention window.
pub struct RetentionSweeper {
    retention: Duration,
    observer: Arc<dyn Observer>,
}

impl RetentionSweeper {
    pub fn new(retention: Duration, observer: Arc<dyn Observer>) -> Self {
        Self { retention, observer }
    }

    pub fn with_default_retention(observer: Arc<dyn Observer>) -> Self {
        Self::new(Duration::hours(DEFAULT_RETENTION_HOURS), observer)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// True when `published_at` lies strictly before `now - retention`,
    /// compared at minute granularity.
    pub fn is_expired(&self, published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        minute_of(published_at) < minute_of(now - self.retention)
    }

    pub fn sweep(&self, store: &mut RecordStore, now: DateTime<Utc>) -> SweepReport {
        let total = store.count();
        let removed = store.retain_where(|article| !self.is_expired(article.published_at, now));
        let report = SweepReport { removed, total };

        self.observer.histogram(metrics::COUNT_PURGED, removed as f64);
        info!("Purged {} articles ({}%)", report.removed, report.percent_removed());

        report
    }

    /// Sweeps under the store's write guard, so no poll cycle can observe a
    /// half-applied eviction.
    pub async fn sweep_shared(&self, store: &SharedStore, now: DateTime<Utc>) -> SweepReport {
        let mut guard = store.write().await;
        self.sweep(&mut guard, now)
    }
}

fn minute_of(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(60)
}
