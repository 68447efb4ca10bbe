//! appfeeds: fetch, normalize and merge installable-app repository feeds
//!
//! Feeds come in a handful of loosely related JSON shapes. This crate turns any number of
//! them into one catalog of apps, news and featured references:
//!
//! ```text
//! SourceRegistry ──► Aggregator ──► FeedFetcher ──► normalize ──► merge ──► AggregateResult
//!                        │              │
//!                        └── CacheStore ┘   (per-feed payloads, normalized feeds, master aggregate)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use appfeeds::{Aggregator, AggregatorConfig, FileCacheStore, FileSourceRegistry};
//!
//! # async fn run() -> appfeeds::error::Result<()> {
//! let store = Arc::new(FileCacheStore::open_default()?);
//! let registry = Arc::new(FileSourceRegistry::new("sources.yaml"));
//! let aggregator = Aggregator::with_http(store, registry, AggregatorConfig::default())?;
//!
//! let catalog = aggregator.aggregate_all().await;
//! println!("{} apps", catalog.apps.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod hash;
pub mod merge;
pub mod normalize;
pub mod progress;
pub mod version;

#[cfg(test)]
mod test_fixtures;

pub use aggregate::{AggregateResult, Aggregator, FeedFailure, StreamUpdate};
pub use cache::{CacheEntry, CacheStore, FileCacheStore, MemoryCacheStore};
pub use config::{
    AggregatorConfig, FileSourceRegistry, SourceOrigin, SourceRegistry, StaticSourceRegistry,
};
pub use domain::{App, AppKey, FeaturedRef, NewsItem, Permission, Screenshots, Version};
pub use error::{FeedsError, Result};
pub use fetch::{FeedFetcher, FetchedFeed, HttpTransport, Transport};
pub use merge::merge;
pub use normalize::{NormalizedFeed, normalize};
pub use progress::ProgressDisplay;
