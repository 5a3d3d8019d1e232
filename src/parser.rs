use crate::types::{FeedDocument, FeedItem, FetchError};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::debug;

/// Turns RSS/Atom documents into [`FeedDocument`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// `fetched_at` stands in for entries that carry no date at all.
    pub fn parse(&self, content: impl AsRef<[u8]>, fetched_at: DateTime<Utc>) -> Result<FeedDocument, FetchError> {
        let content = content.as_ref();
        debug!("Parsing feed content ({} bytes)", content.len());

        // feed-rs hashes link and title into an id for entries without one.
        // A title edit would then look like a new article, so use the
        // permalink instead.
        let feed = parser::Builder::new()
            .id_generator(|links, _title, _uri| links.first().map(|l| l.href.clone()).unwrap_or_default())
            .build()
            .parse(content)
            .map_err(|e| FetchError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content).unwrap_or_default();
        let total = feed.entries.len();

        let items: Vec<FeedItem> = feed
            .entries
            .into_iter()
            .filter_map(|entry| Self::parse_entry(entry, fetched_at))
            .collect();

        if items.len() < total {
            debug!("Dropped {} entries without id or link from '{}'", total - items.len(), title);
        }

        Ok(FeedDocument { title, items })
    }

    fn parse_entry(entry: feed_rs::model::Entry, fetched_at: DateTime<Utc>) -> Option<FeedItem> {
        let identifier = if !entry.id.is_empty() {
            entry.id
        } else {
            entry.links.first()?.href.clone()
        };

        let title = entry.title.map(|t| t.content).unwrap_or_default();

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(fetched_at);

        Some(FeedItem {
            identifier,
            title,
            published_at,
        })
    }
}
