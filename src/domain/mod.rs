//! Domain models for appfeeds
//!
//! This module contains the unified records every feed is normalized into.
//! They are recomputed on every aggregation pass; only the cache layer persists across sessions.

pub mod app;
pub mod featured;
pub mod news;

pub use app::{App, AppKey, Permission, Screenshots, Version};
pub use featured::FeaturedRef;
pub use news::NewsItem;
