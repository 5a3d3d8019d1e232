use crate::config::PublisherConfig;
use crate::traits::Publisher;
use crate::types::{ConfigError, PublishError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

/// Posts statuses through the Twitter v2 API with a user-context bearer token.
pub struct TwitterPublisher {
    client: Client,
    endpoint: String,
    bearer_token: String,
    max_length: usize,
}

impl TwitterPublisher {
    pub fn new(config: &PublisherConfig) -> Result<Self, ConfigError> {
        let bearer_token = config
            .bearer_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::Missing("publisher bearer token".to_string()))?;

        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| ConfigError::invalid("publisher", e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            bearer_token,
            max_length: config.max_length,
        })
    }
}

/// Pulls a code and message out of an API error body. Understands both the
/// v2 problem format and the older `errors` array.
pub fn parse_error_body(status: u16, body: &str) -> (u16, String) {
    let fallback = || (status, format!("HTTP {}", status));

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return if body.trim().is_empty() {
            fallback()
        } else {
            (status, body.trim().to_string())
        };
    };

    if let Some(first) = json.get("errors").and_then(|e| e.get(0)) {
        let code = first
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(status);
        if let Some(message) = first.get("message").and_then(Value::as_str) {
            return (code, message.to_string());
        }
    }

    let message = json
        .get("detail")
        .or_else(|| json.get("title"))
        .and_then(Value::as_str);

    match message {
        Some(message) => (status, message.to_string()),
        None => fallback(),
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn publisher_name(&self) -> String {
        format!("twitter ({})", self.endpoint)
    }

    async fn publish(&self, status: &str) -> Result<(), PublishError> {
        let length = status.chars().count();
        if length > self.max_length {
            return Err(PublishError::TooLong {
                length,
                limit: self.max_length,
            });
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.bearer_token)
            .json(&CreateTweet { text: status })
            .send()
            .await?;

        let http_status = response.status();
        if http_status.is_success() {
            debug!("Publisher accepted status with HTTP {}", http_status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(http_status.as_u16(), &body);
        Err(PublishError::Rejected { code, message })
    }
}
