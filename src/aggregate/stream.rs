//! Incremental aggregation with progress reporting

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::time::Instant;

use super::{Accumulator, AggregateResult, Aggregator, StreamUpdate};

impl Aggregator {
    /// Aggregate every configured feed, reporting progress as feeds complete
    ///
    /// Feeds are processed in chunks of `chunk_size`: concurrently within a chunk, one chunk
    /// after another. After each feed is folded in, `on_update` receives a full snapshot,
    /// throttled to one call per `update_interval`. The update for the last feed is always
    /// delivered, carries `progress == 1.0` and is written to the master cache.
    ///
    /// A fresh, matching master cache short-circuits to a single update. `on_complete` runs
    /// once every feed has been processed, whether or not some of them failed.
    pub async fn stream_aggregate<U, C>(&self, mut on_update: U, on_complete: C)
    where
        U: FnMut(StreamUpdate),
        C: FnOnce(),
    {
        let feed_ids = self.registry.configured_feed_ids();

        if let Some(result) = self.cached_aggregate(&feed_ids).await {
            tracing::info!(feeds = feed_ids.len(), "streaming aggregate from master cache");
            on_update(StreamUpdate {
                result,
                progress: 1.0,
                current_feed_display_name: None,
            });
            on_complete();
            return;
        }

        let total = feed_ids.len();
        if total == 0 {
            let result = AggregateResult::default();
            self.persist(&feed_ids, &result).await;
            on_update(StreamUpdate {
                result,
                progress: 1.0,
                current_feed_display_name: None,
            });
            on_complete();
            return;
        }

        let interval = self.config.update_interval();
        let mut totals = Accumulator::default();
        let mut last_update: Option<Instant> = None;

        for chunk in feed_ids.chunks(self.config.effective_chunk_size()) {
            let mut pending: FuturesUnordered<_> =
                chunk.iter().map(|id| self.load_feed(id)).collect();

            while let Some(loaded) = pending.next().await {
                let display_name = loaded.display_name();
                totals.fold(loaded);

                let finished = totals.completed == total;
                let due = last_update.is_none_or(|at| at.elapsed() >= interval);
                if !finished && !due {
                    continue;
                }

                let result = totals.snapshot();
                if finished {
                    self.persist(&feed_ids, &result).await;
                    tracing::info!(
                        feeds = total,
                        apps = result.apps.len(),
                        failed = result.partial_failures.len(),
                        "streamed aggregate complete"
                    );
                }

                last_update = Some(Instant::now());
                #[allow(clippy::cast_precision_loss)]
                let progress = totals.completed as f64 / total as f64;
                on_update(StreamUpdate {
                    result,
                    progress,
                    current_feed_display_name: Some(display_name),
                });
            }
        }

        on_complete();
    }
}
