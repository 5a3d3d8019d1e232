use crate::category::CategoryRules;
use crate::detector::ChangeDetector;
use crate::publishers::render_change;
use crate::store::SharedStore;
use crate::telemetry::{metrics, HealthStatus, Observer};
use crate::traits::{FeedSource, Publisher};
use crate::types::{ChangeEvent, Detection, FeedDocument};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Tally of one pass over every configured feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub feeds_polled: usize,
    pub feeds_failed: usize,
    pub feeds_skipped: usize,
    pub items_seen: usize,
    pub new: usize,
    pub stale: usize,
    pub changed: usize,
    pub published: usize,
    pub publish_failures: usize,
}

impl CycleReport {
    fn record(&mut self, detection: &Detection) {
        match detection {
            Detection::New => self.new += 1,
            Detection::Stale => self.stale += 1,
            Detection::Changed(_) => self.changed += 1,
        }
    }
}

/// Drives a poll cycle: fetch each feed, run its items through the
/// detector and publish every headline change.
pub struct PollCycle {
    feeds: Vec<String>,
    source: Arc<dyn FeedSource>,
    publisher: Arc<dyn Publisher>,
    observer: Arc<dyn Observer>,
    detector: ChangeDetector,
    rules: CategoryRules,
}

impl PollCycle {
    pub fn new(
        feeds: Vec<String>,
        source: Arc<dyn FeedSource>,
        publisher: Arc<dyn Publisher>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        let detector = ChangeDetector::new(observer.clone());

        Self {
            feeds,
            source,
            publisher,
            observer,
            detector,
            rules: CategoryRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: CategoryRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    /// Runs one pass over the feeds in configured order. Fetch and publish
    /// failures are reported and swallowed; the cycle always completes.
    pub async fn run(&self, store: &SharedStore) -> CycleReport {
        let mut report = CycleReport::default();

        for address in &self.feeds {
            let document = match self.source.fetch(address).await {
                Ok(document) => document,
                Err(e) => {
                    error!("Failed to fetch feed {}: {}", address, e);
                    self.observer.increment(metrics::ERROR_RATE);
                    report.feeds_failed += 1;
                    continue;
                }
            };
            report.feeds_polled += 1;

            let events = self.detect_feed(store, address, document, &mut report).await;

            for event in events {
                self.publish(&event, &mut report).await;
            }
        }

        let article_count = store.read().await.count();
        self.observer.histogram(metrics::ARTICLE_COUNT, article_count as f64);
        self.observer.histogram(metrics::FEEDITEMS_COUNT, report.items_seen as f64);

        info!(
            "Poll cycle done: {} items from {}/{} feeds, {} new, {} changed, {} tracked",
            report.items_seen,
            report.feeds_polled,
            self.feeds.len(),
            report.new,
            report.changed,
            article_count
        );

        report
    }

    /// Feeds one document through the detector under a single write guard
    /// and returns the change events it produced.
    async fn detect_feed(
        &self,
        store: &SharedStore,
        address: &str,
        document: FeedDocument,
        report: &mut CycleReport,
    ) -> Vec<ChangeEvent> {
        let category = self.rules.derive(&document.title);
        if category.is_empty() {
            warn!("Feed {} ('{}') has no usable category, skipping", address, document.title);
            report.feeds_skipped += 1;
            return Vec::new();
        }

        debug!("Checking {} items from {} as [{}]", document.items.len(), address, category);
        report.items_seen += document.items.len();

        let mut guard = store.write().await;
        guard.note_category(&category);
        let mut events = Vec::new();

        for item in document.items {
            let detection = self.detector.detect(&mut guard, item, &category);
            report.record(&detection);
            if let Some(event) = detection.into_change() {
                events.push(event);
            }
        }

        events
    }

    async fn publish(&self, event: &ChangeEvent, report: &mut CycleReport) {
        let status = render_change(event);

        match self.publisher.publish(&status).await {
            Ok(()) => {
                self.observer.check(metrics::TWEET_RESULT, HealthStatus::Ok);
                info!("Sent out a status via {}: {}", self.publisher.publisher_name(), status);
                report.published += 1;
            }
            Err(e) => {
                error!("Publishing change for {} failed: {}", event.identifier, e);
                self.observer.event(
                    metrics::PUBLISH_FAILED_EVENT,
                    &format!("Error {}: {}", e.code(), e.message()),
                );
                self.observer.check(metrics::TWEET_RESULT, HealthStatus::Warning);
                self.observer.increment(metrics::ERROR_RATE);
                report.publish_failures += 1;
            }
        }
    }
}
