use crate::types::{ArticleKey, TrackedArticle};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Store handle shared by the poll cycle, the sweeper and the heartbeat.
/// Every compound read-then-write runs under one write guard.
pub type SharedStore = Arc<RwLock<RecordStore>>;

/// In-memory set of tracked articles, at most one per (identifier, category).
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    articles: HashMap<ArticleKey, TrackedArticle>,
    // Outlives the records: an emptied category still reports zero.
    categories: BTreeSet<String>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn find(&self, identifier: &str, category: &str) -> Option<&TrackedArticle> {
        self.articles.get(&ArticleKey::new(identifier, category))
    }

    /// Adds a record whose key is not yet present. An existing record with
    /// the same key is left untouched.
    pub fn insert(&mut self, article: TrackedArticle) -> bool {
        let key = article.key();
        if self.articles.contains_key(&key) {
            return false;
        }
        self.note_category(&article.category);
        self.articles.insert(key, article);
        true
    }

    /// Swaps the stored record for `article` and hands back the previous one.
    /// Returns `None`, storing nothing, when no record shares the key.
    pub fn replace(&mut self, article: TrackedArticle) -> Option<TrackedArticle> {
        let slot = self.articles.get_mut(&article.key())?;
        Some(std::mem::replace(slot, article))
    }

    /// Keeps the records matching `keep` and returns how many were dropped.
    pub fn retain_where<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&TrackedArticle) -> bool,
    {
        let before = self.articles.len();
        self.articles.retain(|_, article| keep(article));
        before - self.articles.len()
    }

    pub fn count(&self) -> usize {
        self.articles.len()
    }

    pub fn count_by_category(&self, category: &str) -> usize {
        self.articles
            .values()
            .filter(|article| article.category == category)
            .count()
    }

    /// Remembers `category` as watched, even while it holds no records.
    pub fn note_category(&mut self, category: &str) {
        if !self.categories.contains(category) {
            self.categories.insert(category.to_string());
        }
    }

    /// Number of records per watched category, ordered by category name.
    /// Categories whose records were all swept report 0.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = self.categories.iter().map(|c| (c.clone(), 0)).collect();
        for article in self.articles.values() {
            *counts.entry(article.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedArticle> {
        self.articles.values()
    }
}
