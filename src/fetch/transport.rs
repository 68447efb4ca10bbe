//! Network transport for feed retrieval

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::config::AggregatorConfig;
use crate::error::{Result, feed};

/// Retrieves the raw body of a feed URL
///
/// Implementations must bypass any transport-level caches so a retrieval always revalidates
/// with the origin.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// HTTP(S) transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| feed::transport_failed("<client>", e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "requesting feed");

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| feed::transport_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(feed::http_status(url, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| feed::transport_failed(url, e.to_string()))
    }
}
