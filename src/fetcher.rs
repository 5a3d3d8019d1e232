use crate::config::FetchConfig;
use crate::types::FetchError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// One-shot HTTP downloader for feed documents. Failures are returned to
/// the caller; the next poll cycle is the retry.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    fn max_bytes(&self) -> u64 {
        self.config.max_feed_size_mb as u64 * 1024 * 1024
    }

    /// Downloads the raw document. The body is read chunk by chunk and the
    /// download is abandoned as soon as it passes `max_feed_size_mb`, with or
    /// without a Content-Length header.
    pub async fn fetch(&self, address: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(address)?;
        let start_time = Instant::now();
        let max_bytes = self.max_bytes();

        debug!("Fetching feed: {}", url);

        let mut response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > max_bytes {
                return Err(FetchError::TooLarge {
                    address: address.to_string(),
                    size_bytes: content_length,
                });
            }
        }

        let mut content = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            content.extend_from_slice(&chunk);
            if content.len() as u64 > max_bytes {
                return Err(FetchError::TooLarge {
                    address: address.to_string(),
                    size_bytes: content.len() as u64,
                });
            }
        }

        info!(
            "Fetched feed: {} ({} bytes in {}ms)",
            address,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}
