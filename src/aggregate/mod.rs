//! Aggregation across all configured feeds
//!
//! The [`Aggregator`] owns the cache store and drives fetch, normalize and merge for every
//! feed the [`SourceRegistry`] lists. Two entry points share the same pipeline:
//!
//! - [`Aggregator::aggregate_all`] (`batch.rs`): everything at once
//! - [`Aggregator::stream_aggregate`] (`stream.rs`): chunked, with throttled progress updates
//!
//! ## Master cache
//!
//! The merged result is stored under the configured master key together with the feed list it
//! was built from. It is served without any network activity while it is younger than the TTL
//! and the configured feed list is exactly the same, order included.
//!
//! ## Failures
//!
//! A feed that cannot be fetched contributes nothing and is reported in
//! [`AggregateResult::partial_failures`]. Failures are never written to the master cache.

pub mod batch;
pub mod news;
pub mod stream;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{self, CacheEntry, CacheStore};
use crate::config::{AggregatorConfig, SourceRegistry};
use crate::domain::{App, FeaturedRef, NewsItem};
use crate::error::Result;
use crate::fetch::{FeedFetcher, FetchedFeed, HttpTransport, Transport};
use crate::hash;
use crate::merge;
use crate::normalize::{self, NormalizedFeed};

/// A feed that contributed nothing because it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFailure {
    pub feed_id: String,
    pub reason: String,
}

/// Consolidated view over every configured feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub apps: Vec<App>,
    pub news: Vec<NewsItem>,
    pub featured: Vec<FeaturedRef>,
    /// Feeds that failed during this pass; empty when served from the master cache
    #[serde(skip)]
    pub partial_failures: Vec<FeedFailure>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.news.is_empty() && self.featured.is_empty()
    }
}

/// One streaming progress report, carrying the full state so far
#[derive(Debug, Clone, PartialEq)]
pub struct StreamUpdate {
    pub result: AggregateResult,
    /// Completed feeds over configured feeds, `0.0..=1.0`
    pub progress: f64,
    /// Feed whose completion triggered this update
    pub current_feed_display_name: Option<String>,
}

/// What one feed contributed to a pass
#[derive(Debug)]
struct LoadedFeed {
    feed_id: String,
    outcome: std::result::Result<FeedContribution, FeedFailure>,
}

#[derive(Debug)]
struct FeedContribution {
    feed: NormalizedFeed,
    changed: bool,
}

impl LoadedFeed {
    fn display_name(&self) -> String {
        self.outcome
            .as_ref()
            .ok()
            .and_then(|c| c.feed.feed_display_name.clone())
            .unwrap_or_else(|| self.feed_id.clone())
    }
}

/// Running totals of a pass
#[derive(Debug, Default)]
struct Accumulator {
    apps: Vec<App>,
    news: Vec<NewsItem>,
    featured: Vec<FeaturedRef>,
    failures: Vec<FeedFailure>,
    any_changed: bool,
    completed: usize,
}

impl Accumulator {
    fn fold(&mut self, loaded: LoadedFeed) {
        self.completed += 1;
        match loaded.outcome {
            Ok(contribution) => {
                self.any_changed |= contribution.changed;
                self.apps.extend(contribution.feed.apps);
                self.news.extend(contribution.feed.news);
                self.featured.extend(contribution.feed.featured);
            }
            Err(failure) => self.failures.push(failure),
        }
    }

    /// Merge everything folded so far
    fn snapshot(&self) -> AggregateResult {
        let apps = merge::merge(self.apps.clone());
        let news = news::finalize_news(self.news.clone(), &apps);
        AggregateResult {
            news,
            featured: news::dedupe_featured(self.featured.clone()),
            partial_failures: self.failures.clone(),
            apps,
        }
    }
}

/// Drives fetch, normalize and merge over the configured feeds
#[derive(Clone)]
pub struct Aggregator {
    fetcher: FeedFetcher,
    store: Arc<dyn CacheStore>,
    registry: Arc<dyn SourceRegistry>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
        registry: Arc<dyn SourceRegistry>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            fetcher: FeedFetcher::new(transport, store.clone(), &config),
            store,
            registry,
            config,
        }
    }

    /// Aggregator fetching over HTTP(S)
    pub fn with_http(
        store: Arc<dyn CacheStore>,
        registry: Arc<dyn SourceRegistry>,
        config: AggregatorConfig,
    ) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::new(transport, store, registry, config))
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Prepare the cache store
    pub async fn init(&self) -> bool {
        self.store.init().await
    }

    /// Fetch a single feed; unlike aggregation, failures are returned to the caller
    pub async fn fetch_feed(&self, feed_id: &str, force_refresh: bool) -> Result<FetchedFeed> {
        self.fetcher.fetch(feed_id, force_refresh).await
    }

    /// Drop the master cache entry so the next pass rebuilds the aggregate
    pub async fn invalidate(&self) -> bool {
        self.store.remove(&self.config.master_cache_key).await
    }

    /// Master cache entry, if it is fresh and was built from exactly `feed_ids`
    async fn cached_aggregate(&self, feed_ids: &[String]) -> Option<AggregateResult> {
        let entry = self.store.get(&self.config.master_cache_key).await?;
        if !entry.is_fresh(self.config.cache_ttl()) {
            tracing::debug!("master cache expired");
            return None;
        }
        if entry.feed_ids.as_deref() != Some(feed_ids) {
            tracing::debug!("master cache built from a different feed list");
            return None;
        }

        match serde_json::from_value(entry.payload) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable master cache entry");
                None
            }
        }
    }

    /// Re-stamp the master entry if it still matches `feed_ids`, returning its aggregate
    async fn reuse_master(&self, feed_ids: &[String]) -> Option<AggregateResult> {
        let mut entry = self.store.get(&self.config.master_cache_key).await?;
        if entry.feed_ids.as_deref() != Some(feed_ids) {
            return None;
        }
        let result: AggregateResult = serde_json::from_value(entry.payload.clone()).ok()?;
        entry.touch();
        self.store.set(&self.config.master_cache_key, entry).await;
        Some(result)
    }

    async fn persist(&self, feed_ids: &[String], result: &AggregateResult) {
        let payload = match serde_json::to_value(result) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize aggregate");
                return;
            }
        };

        let entry = CacheEntry::new(payload).with_feed_ids(feed_ids.to_vec());
        if !self.store.set(&self.config.master_cache_key, entry).await {
            tracing::debug!("master cache write skipped");
        }
    }

    /// Fetch and normalize one feed, reusing its normalized cache when the payload is unchanged
    async fn load_feed(&self, feed_id: &str) -> LoadedFeed {
        let outcome = match self.fetcher.fetch(feed_id, false).await {
            Ok(fetched) => Ok(self.normalize_feed(feed_id, fetched).await),
            Err(e) => {
                tracing::warn!(feed_id, error = %e, "feed failed, continuing without it");
                Err(FeedFailure {
                    feed_id: feed_id.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        LoadedFeed {
            feed_id: feed_id.to_string(),
            outcome,
        }
    }

    /// Normalized feed for `fetched`
    ///
    /// The normalized entry records the content hash of the raw payload it was built from and
    /// is only reused while that hash still matches. A mismatch counts as a change even when
    /// the fetch itself reported none.
    async fn normalize_feed(&self, feed_id: &str, fetched: FetchedFeed) -> FeedContribution {
        let key = cache::normalized_key(feed_id.trim());

        if let Some(feed) = self.cached_normalized(feed_id, &key, &fetched).await {
            return FeedContribution {
                feed,
                changed: false,
            };
        }

        let feed = normalize::normalize(&fetched.payload, &fetched.origin_url);
        match serde_json::to_value(&feed) {
            Ok(payload) => {
                let mut entry = CacheEntry::new(payload);
                entry.content_hash.clone_from(&fetched.content_hash);
                self.store.set(&key, entry).await;
            }
            Err(e) => tracing::warn!(feed_id, error = %e, "failed to serialize normalized feed"),
        }

        FeedContribution {
            feed,
            changed: true,
        }
    }

    async fn cached_normalized(
        &self,
        feed_id: &str,
        key: &str,
        fetched: &FetchedFeed,
    ) -> Option<NormalizedFeed> {
        if fetched.changed {
            return None;
        }
        let raw_hash = fetched.content_hash.as_deref()?;
        let entry = self.store.get(key).await?;

        if !entry
            .content_hash
            .as_deref()
            .is_some_and(|built_from| hash::verify_hash(built_from, raw_hash))
        {
            tracing::debug!(feed_id, "normalized cache built from another payload");
            return None;
        }

        match serde_json::from_value::<NormalizedFeed>(entry.payload) {
            Ok(feed) => {
                tracing::debug!(feed_id, "reusing normalized feed");
                Some(feed)
            }
            Err(e) => {
                tracing::debug!(feed_id, error = %e, "normalized cache unreadable");
                None
            }
        }
    }
}
