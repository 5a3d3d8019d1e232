use crate::types::{FeedDocument, FetchError, PublishError};
use async_trait::async_trait;

/// Anything that can hand over the current contents of a feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `address`. Implementations must fail
    /// within bounded time rather than block indefinitely.
    async fn fetch(&self, address: &str) -> Result<FeedDocument, FetchError>;
}

/// Outbound channel for change notifications.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Human-readable name for logs
    fn publisher_name(&self) -> String;

    /// Send one status text. A single attempt, no retries.
    async fn publish(&self, status: &str) -> Result<(), PublishError>;
}
