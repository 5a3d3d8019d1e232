//! Runtime configuration, loaded once at startup.

use crate::category::DEFAULT_BOILERPLATE;
use crate::sweeper::DEFAULT_RETENTION_HOURS;
use crate::types::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use url::Url;

pub const DEFAULT_FEED_ROOT: &str = "http://feeds.nos.nl/";

pub const DEFAULT_FEEDS: &[&str] = &[
    "nosnieuwsbinnenland",
    "nosnieuwsalgemeen",
    "nosnieuwsbuitenland",
    "nosnieuwspolitiek",
    "nosnieuwseconomie",
    "nosnieuwscultuurenmedia",
    "nosnieuwstech",
    "nosnieuwskoningshuis",
];

pub const DEFAULT_TWEET_ENDPOINT: &str = "https://api.twitter.com/2/tweets";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
    pub use_system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "headline-watch/0.1".to_string(),
            timeout_seconds: 20,
            max_feed_size_mb: 10,
            max_redirects: 5,
            use_system_proxy: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub bearer_token: Option<String>,
    pub dry_run: bool,
    pub max_length: usize,
    pub timeout_seconds: u64,
    pub use_system_proxy: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TWEET_ENDPOINT.to_string(),
            bearer_token: None,
            dry_run: false,
            max_length: 280,
            timeout_seconds: 20,
            use_system_proxy: true,
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("dry_run", &self.dry_run)
            .field("max_length", &self.max_length)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("use_system_proxy", &self.use_system_proxy)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub feed_root: String,
    /// Feed names resolved against `feed_root`, or absolute addresses.
    pub feeds: Vec<String>,
    pub poll_interval_secs: u64,
    pub sweep_interval_hours: u64,
    pub heartbeat_interval_secs: u64,
    pub retention_hours: i64,
    pub category_boilerplate: Vec<String>,
    pub statsd_addr: Option<String>,
    pub statsd_prefix: String,
    pub fetch: FetchConfig,
    pub publisher: PublisherConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            feed_root: DEFAULT_FEED_ROOT.to_string(),
            feeds: DEFAULT_FEEDS.iter().map(|f| f.to_string()).collect(),
            poll_interval_secs: 30,
            sweep_interval_hours: 24,
            heartbeat_interval_secs: 60,
            retention_hours: DEFAULT_RETENTION_HOURS,
            category_boilerplate: DEFAULT_BOILERPLATE.iter().map(|t| t.to_string()).collect(),
            statsd_addr: None,
            statsd_prefix: "nosedits-".to_string(),
            fetch: FetchConfig::default(),
            publisher: PublisherConfig::default(),
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_hours * 60 * 60)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.retention_hours)
    }

    /// Feed addresses in configured order.
    pub fn feed_addresses(&self) -> Vec<String> {
        self.feeds
            .iter()
            .map(|feed| {
                if feed.contains("://") {
                    feed.clone()
                } else {
                    format!("{}/{}", self.feed_root.trim_end_matches('/'), feed.trim_start_matches('/'))
                }
            })
            .collect()
    }

    pub fn statsd_socket_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        let Some(addr) = self.statsd_addr.as_deref().filter(|a| !a.is_empty()) else {
            return Ok(None);
        };

        addr.to_socket_addrs()
            .map_err(|e| ConfigError::invalid("statsd_addr", e))?
            .next()
            .map(Some)
            .ok_or_else(|| ConfigError::invalid("statsd_addr", format!("'{}' resolves to nothing", addr)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.is_empty() {
            return Err(ConfigError::Missing("feeds".to_string()));
        }

        for address in self.feed_addresses() {
            let url = Url::parse(&address).map_err(|e| ConfigError::invalid("feeds", format!("{}: {}", address, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::invalid("feeds", format!("{} is not an http(s) address", address)));
            }
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::invalid("poll_interval_secs", "must be positive"));
        }
        if self.sweep_interval_hours == 0 {
            return Err(ConfigError::invalid("sweep_interval_hours", "must be positive"));
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::invalid("heartbeat_interval_secs", "must be positive"));
        }
        if self.retention_hours <= 0 {
            return Err(ConfigError::invalid("retention_hours", "must be positive"));
        }
        if self.fetch.timeout_seconds == 0 {
            return Err(ConfigError::invalid("fetch.timeout_seconds", "a feed fetch needs a bounded timeout"));
        }

        if !self.publisher.dry_run && self.publisher.bearer_token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing(
                "publisher bearer token (set TWITTER_BEARER_TOKEN or use --dry-run)".to_string(),
            ));
        }

        self.statsd_socket_addr()?;
        Ok(())
    }
}
