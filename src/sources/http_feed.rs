use crate::config::FetchConfig;
use crate::traits::FeedSource;
use crate::types::{FeedDocument, FetchError};
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

/// Feed source that downloads over HTTP and parses with feed-rs.
pub struct HttpFeedSource {
    fetcher: Fetcher,
    parser: FeedParser,
}

impl HttpFeedSource {
    pub fn new(fetch_config: FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
            parser: FeedParser::new(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, address: &str) -> Result<FeedDocument, FetchError> {
        let fetched_at = Utc::now();
        let content = self.fetcher.fetch(address).await?;
        let document = self.parser.parse(&content, fetched_at)?;

        info!("Pulled {} items from '{}' ({})", document.items.len(), document.title, address);
        Ok(document)
    }
}
