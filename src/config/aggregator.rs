//! Aggregator settings (appfeeds.yaml)
//!
//! Every key is optional; anything missing falls back to the built-in defaults.
//!
//! ```yaml
//! cache_ttl_ms: 900000
//! chunk_size: 8
//! update_interval_ms: 500
//! feed_base_url: https://raw.githubusercontent.com/ripestore/repos/main/
//! master_cache_key: ripe_master_cache_v3
//! request_timeout_ms: 30000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, config};

/// Feeds referenced by name are expanded against this base
pub const DEFAULT_FEED_BASE_URL: &str = "https://raw.githubusercontent.com/ripestore/repos/main/";

/// Cache key of the merged aggregate
pub const DEFAULT_MASTER_CACHE_KEY: &str = "ripe_master_cache_v3";

const DEFAULT_CACHE_TTL_MS: u64 = 15 * 60 * 1000;
const DEFAULT_CHUNK_SIZE: usize = 8;
const DEFAULT_UPDATE_INTERVAL_MS: u64 = 500;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// User agent sent with every feed request
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Settings shared by the fetcher and the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Age below which cached feeds and aggregates are served without a network call
    pub cache_ttl_ms: u64,
    /// Feeds processed in parallel per streaming chunk
    pub chunk_size: usize,
    /// Minimum spacing between streaming updates
    pub update_interval_ms: u64,
    pub feed_base_url: String,
    pub master_cache_key: String,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            master_cache_key: DEFAULT_MASTER_CACHE_KEY.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AggregatorConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(config::not_found(display));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| config::read_failed(&display, e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| config::parse_failed(display, e.to_string()))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Chunk size, never zero
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
