//! All-at-once aggregation

use futures::future::join_all;

use super::{Accumulator, AggregateResult, Aggregator};

impl Aggregator {
    /// Aggregate every configured feed
    ///
    /// Serves the master cache when it is fresh and matches the configured feed list. Otherwise
    /// fetches all feeds concurrently, waits for every one of them to settle, merges, and writes
    /// the new aggregate back. Per-feed failures end up in `partial_failures`.
    pub async fn aggregate_all(&self) -> AggregateResult {
        let feed_ids = self.registry.configured_feed_ids();

        if let Some(cached) = self.cached_aggregate(&feed_ids).await {
            tracing::info!(feeds = feed_ids.len(), "serving aggregate from master cache");
            return cached;
        }

        let loaded = join_all(feed_ids.iter().map(|id| self.load_feed(id))).await;

        let mut totals = Accumulator::default();
        for feed in loaded {
            totals.fold(feed);
        }

        if !totals.any_changed && totals.failures.is_empty() {
            if let Some(result) = self.reuse_master(&feed_ids).await {
                tracing::info!(feeds = feed_ids.len(), "no feed changed, reusing aggregate");
                return result;
            }
        }

        let result = totals.snapshot();
        self.persist(&feed_ids, &result).await;

        tracing::info!(
            feeds = feed_ids.len(),
            apps = result.apps.len(),
            news = result.news.len(),
            failed = result.partial_failures.len(),
            "aggregated feeds"
        );
        result
    }
}
