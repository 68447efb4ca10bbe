//! Cache statistics
//!
//! Sizes are reported for the file-backed store only; the in-memory store has no footprint
//! worth reporting.

use std::fs;
use std::path::Path;

use super::file::is_store_file_name;
use crate::error::{Result, cache};

/// Extension of every entry file written by [`super::FileCacheStore`]
pub const ENTRY_EXTENSION: &str = "json";

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached entries
    pub entries: usize,
    /// Total size in bytes
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let size = self.total_size as f64;
        if size < 1024.0 {
            format!("{} B", self.total_size)
        } else if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else if size < 1024.0 * 1024.0 * 1024.0 {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        } else {
            format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

/// Collect statistics for the entry files in `dir`
///
/// Only files named the way [`super::FileCacheStore`] names its entries are counted. A missing
/// directory is an empty cache.
pub fn cache_stats(dir: &Path) -> Result<CacheStats> {
    if !dir.exists() {
        return Ok(CacheStats::default());
    }

    let mut stats = CacheStats::default();

    let entries = fs::read_dir(dir)
        .map_err(|e| cache::operation_failed(format!("Failed to read cache directory: {}", e)))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| cache::operation_failed(format!("Failed to read entry: {}", e)))?;

        let path = entry.path();
        let is_entry = path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
            && entry.file_name().to_str().is_some_and(is_store_file_name);
        if !path.is_file() || !is_entry {
            continue;
        }

        stats.entries += 1;
        if let Ok(metadata) = entry.metadata() {
            stats.total_size += metadata.len();
        }
    }

    Ok(stats)
}
