//! Feed caching for appfeeds
//!
//! This module defines the key-value cache the fetcher and the aggregator share.
//!
//! ## Cache Structure
//!
//! ```text
//! feed:<feed-id>            raw payload + content hash of the last response body
//! normalized:<feed-id>      normalized apps/news/featured for that payload
//! <master key>              merged aggregate + feed-set fingerprint it was built from
//! ```
//!
//! Every entry carries the time it was written. Stores never fail loudly: an unavailable
//! medium behaves like an empty cache, and writes report `false`.
//!
//! ## Module Organization
//!
//! - `memory.rs`: in-process store, used for embedding and as a test fake
//! - `file.rs`: one JSON file per key under the user's cache directory
//! - `stats.rs`: size statistics for the file store

pub mod file;
pub mod memory;
pub mod stats;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{self, Result};

pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;
pub use stats::CacheStats;

/// Default cache directory name under user's cache directory
const CACHE_DIR: &str = "appfeeds";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "APPFEEDS_CACHE_DIR";

/// Get the default cache directory path
///
/// Uses the platform's standard cache location with an `appfeeds` subdirectory.
/// Can be overridden with the `APPFEEDS_CACHE_DIR` environment variable.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(cache_dir) = std::env::var(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(cache_dir));
    }

    let base = dirs::cache_dir()
        .ok_or_else(|| error::cache::operation_failed("Could not determine cache directory"))?;

    Ok(base.join(CACHE_DIR))
}

/// Cache key for a feed's raw payload
pub fn feed_key(feed_id: &str) -> String {
    format!("feed:{}", feed_id)
}

/// Cache key for a feed's normalized records
pub fn normalized_key(feed_id: &str) -> String {
    format!("normalized:{}", feed_id)
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// One timestamped cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Write time, milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Feed-set fingerprint, only present on the master entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_ids: Option<Vec<String>>,
    pub payload: JsonValue,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(payload: JsonValue) -> Self {
        Self {
            timestamp: now_millis(),
            content_hash: None,
            feed_ids: None,
            payload,
        }
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_feed_ids(mut self, feed_ids: Vec<String>) -> Self {
        self.feed_ids = Some(feed_ids);
        self
    }

    /// Age of the entry; entries stamped in the future count as brand new
    pub fn age(&self) -> Duration {
        let elapsed = now_millis().saturating_sub(self.timestamp);
        Duration::from_millis(u64::try_from(elapsed).unwrap_or(0))
    }

    /// Whether the entry is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }

    /// Re-stamp the entry with the current time
    pub fn touch(&mut self) {
        self.timestamp = now_millis();
    }
}

/// Durable key-value store backing every cache layer
///
/// Implementations must degrade to "cache miss" / `false` when the underlying medium is
/// unavailable instead of returning errors. Concurrent calls against different keys are
/// independent; a get-then-set race on one key is tolerated (last writer wins).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Prepare the medium (create directories, open handles). Idempotent.
    async fn init(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Option<CacheEntry>;

    async fn set(&self, key: &str, entry: CacheEntry) -> bool;

    async fn remove(&self, key: &str) -> bool;

    async fn clear(&self) -> bool;
}
