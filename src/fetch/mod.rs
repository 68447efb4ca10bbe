//! Single-feed retrieval
//!
//! [`FeedFetcher::fetch`] resolves a feed identifier, serves fresh cache entries without
//! touching the network, and otherwise revalidates with the origin:
//!
//! 1. Fresh cache entry (younger than the TTL) and no forced refresh: return it, `changed=false`
//! 2. Fetch the body and hash it. Same hash as the cached entry: re-stamp it, `changed=false`
//! 3. New content: run the parse pipeline, store payload + hash, `changed=true`
//! 4. Transport or parse failure: serve the stale entry if there is one, else fail
//!
//! Fetches for different feeds share nothing but the cache store and can run concurrently.

pub mod parse;
pub mod transport;
pub mod url;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::cache::{self, CacheEntry, CacheStore};
use crate::config::AggregatorConfig;
use crate::error::{Result, feed};
use crate::hash;

pub use parse::{ParseOutcome, ParseStrategy, parse_payload};
pub use transport::{HttpTransport, Transport};
pub use url::resolve_feed_url;

/// Result of fetching one feed
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedFeed {
    pub payload: JsonValue,
    /// URL the feed identifier resolved to
    pub origin_url: String,
    /// Whether the payload differs from what the cache held before this call
    pub changed: bool,
    /// Hash of the raw body `payload` was parsed from
    pub content_hash: Option<String>,
}

/// Cache-aware feed fetcher
#[derive(Clone)]
pub struct FeedFetcher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CacheStore>,
    base_url: String,
    cache_ttl: Duration,
}

impl FeedFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            transport,
            store,
            base_url: config.feed_base_url.clone(),
            cache_ttl: config.cache_ttl(),
        }
    }

    /// Fetch one feed, consulting the cache first unless `force_refresh` is set
    pub async fn fetch(&self, feed_id: &str, force_refresh: bool) -> Result<FetchedFeed> {
        let origin_url = resolve_feed_url(feed_id, &self.base_url)?;
        let key = cache::feed_key(feed_id.trim());
        let cached = self.store.get(&key).await;

        if !force_refresh {
            if let Some(entry) = cached.as_ref().filter(|e| e.is_fresh(self.cache_ttl)) {
                tracing::debug!(feed_id, "feed cache hit");
                return Ok(FetchedFeed {
                    payload: entry.payload.clone(),
                    origin_url,
                    changed: false,
                    content_hash: entry.content_hash.clone(),
                });
            }
        }

        match self.revalidate(&origin_url, &key, cached.as_ref()).await {
            Ok(fetched) => Ok(fetched),
            Err(e) if e.is_recoverable_with_cache() => match cached {
                Some(stale) => {
                    tracing::warn!(feed_id, error = %e, "serving stale cached feed");
                    Ok(FetchedFeed {
                        payload: stale.payload,
                        origin_url,
                        changed: false,
                        content_hash: stale.content_hash,
                    })
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn revalidate(
        &self,
        origin_url: &str,
        key: &str,
        cached: Option<&CacheEntry>,
    ) -> Result<FetchedFeed> {
        let body = self.transport.get_text(origin_url).await?;
        let content_hash = hash::content_hash(body.as_bytes());

        if let Some(entry) = cached {
            let unchanged = entry
                .content_hash
                .as_deref()
                .is_some_and(|previous| hash::verify_hash(previous, &content_hash));
            if unchanged {
                tracing::debug!(url = origin_url, "feed content unchanged");
                let mut refreshed = entry.clone();
                refreshed.touch();
                let payload = refreshed.payload.clone();
                let content_hash = refreshed.content_hash.clone();
                self.store.set(key, refreshed).await;
                return Ok(FetchedFeed {
                    payload,
                    origin_url: origin_url.to_string(),
                    changed: false,
                    content_hash,
                });
            }
        }

        let payload = match parse_payload(&body) {
            ParseOutcome::Parsed { value, .. } => value,
            ParseOutcome::Failed { reason } => {
                return Err(feed::malformed_payload(origin_url, reason));
            }
        };

        let entry = CacheEntry::new(payload.clone()).with_content_hash(content_hash.clone());
        if !self.store.set(key, entry).await {
            tracing::debug!(url = origin_url, "feed cache write skipped");
        }

        Ok(FetchedFeed {
            payload,
            origin_url: origin_url.to_string(),
            changed: true,
            content_hash: Some(content_hash),
        })
    }
}
