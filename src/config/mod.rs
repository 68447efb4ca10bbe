//! Configuration handling for appfeeds
//!
//! This module contains data structures for:
//! - `appfeeds.yaml` - Aggregator settings (TTLs, chunking, feed base URL)
//! - `sources.yaml` - The ordered list of configured feeds

pub mod aggregator;
pub mod registry;

// Re-export commonly used types
pub use aggregator::AggregatorConfig;
pub use registry::{
    FileSourceRegistry, SourceOrigin, SourceRegistry, StaticSourceRegistry, DEFAULT_SOURCE,
};
