use crate::store::RecordStore;
use crate::telemetry::{metrics, Observer};
use crate::types::{ChangeEvent, Detection, FeedItem, TrackedArticle};
use std::sync::Arc;
use tracing::{debug, info};

/// Matches fetched items against the store and records headline changes.
pub struct ChangeDetector {
    observer: Arc<dyn Observer>,
}

impl ChangeDetector {
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self { observer }
    }

    /// Classifies `item` under `category` and applies the matching store
    /// mutation. Titles compare byte for byte; trimming only happens when
    /// the change is rendered for publishing.
    pub fn detect(&self, store: &mut RecordStore, item: FeedItem, category: &str) -> Detection {
        let existing_title = match store.find(&item.identifier, category) {
            Some(existing) => existing.title.clone(),
            None => {
                debug!("New article {} in {}", item.identifier, category);
                store.insert(TrackedArticle::from_item(item, category));
                self.observer.increment(metrics::ARTICLE_NEW);
                return Detection::New;
            }
        };

        if existing_title == item.title {
            self.observer.increment(metrics::ARTICLE_STALE);
            return Detection::Stale;
        }

        let event = ChangeEvent {
            category: category.to_string(),
            old_title: existing_title,
            new_title: item.title.clone(),
            identifier: item.identifier.clone(),
        };

        let article = TrackedArticle::from_item(item, category);
        info!("Replacing article {}: title changed", article.key());
        store.replace(article);
        self.observer.increment(metrics::ARTICLE_CHANGED);

        Detection::Changed(event)
    }
}
