use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry as returned by a feed source, before a category is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub identifier: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

impl FeedItem {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            published_at,
        }
    }
}

/// A fetched feed: its own title plus the items in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: String,
    pub items: Vec<FeedItem>,
}

/// Identity of a tracked article. The same identifier under two categories
/// names two different articles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArticleKey {
    pub identifier: String,
    pub category: String,
}

impl ArticleKey {
    pub fn new(identifier: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedArticle {
    pub identifier: String,
    pub category: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

impl TrackedArticle {
    pub fn from_item(item: FeedItem, category: impl Into<String>) -> Self {
        Self {
            identifier: item.identifier,
            category: category.into(),
            title: item.title,
            published_at: item.published_at,
        }
    }

    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(self.identifier.clone(), self.category.clone())
    }
}

/// A headline that changed between two sightings of the same article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub category: String,
    pub old_title: String,
    pub new_title: String,
    pub identifier: String,
}

/// Outcome of feeding one item through the change detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    New,
    Stale,
    Changed(ChangeEvent),
}

impl Detection {
    pub fn change(&self) -> Option<&ChangeEvent> {
        match self {
            Detection::Changed(event) => Some(event),
            _ => None,
        }
    }

    pub fn into_change(self) -> Option<ChangeEvent> {
        match self {
            Detection::Changed(event) => Some(event),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed {address} answered with HTTP {status}")]
    Status { address: String, status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid feed address: {0}")]
    InvalidAddress(#[from] url::ParseError),

    #[error("Feed {address} is too large: at least {size_bytes} bytes")]
    TooLarge { address: String, size_bytes: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Publisher rejected status ({code}): {message}")]
    Rejected { code: u16, message: String },

    #[error("Publisher transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Status is {length} characters, limit is {limit}")]
    TooLong { length: usize, limit: usize },
}

impl PublishError {
    /// Numeric code as reported to telemetry. Zero when the failure never
    /// reached the downstream service.
    pub fn code(&self) -> u16 {
        match self {
            PublishError::Rejected { code, .. } => *code,
            PublishError::Transport(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
            PublishError::TooLong { .. } => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            PublishError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;
