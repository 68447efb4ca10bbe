//! File-backed cache store
//!
//! Each key is stored as one JSON document under the cache directory:
//!
//! ```text
//! ~/.cache/appfeeds/
//! ├── feed-RipeStore-1b2c3d4e5f60.json
//! ├── normalized-RipeStore-7a8b9c0d1e2f.json
//! └── ripe_master_cache_v3-0a1b2c3d4e5f.json
//! ```
//!
//! The readable slug keeps the directory browsable; the hash suffix keeps keys that slug to
//! the same text apart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::stats::{self, CacheStats, ENTRY_EXTENSION};
use super::{CacheEntry, CacheStore};
use crate::error::Result;

/// Longest slug kept from a key before the hash suffix
const MAX_SLUG_LEN: usize = 80;

/// Hex characters of the key hash appended to each file name
const KEY_HASH_LEN: usize = 12;

/// Extension of an entry while it is being written
const TEMP_EXTENSION: &str = "tmp";

/// Convert a cache key to a file-system safe slug
///
/// Strips URL schemes and replaces separators, so `feed:https://host/a.json` becomes
/// `feed-host-a.json`.
pub fn key_to_slug(key: &str) -> String {
    let slug: String = key
        .replace("https://", "")
        .replace("http://", "")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    slug.trim_matches(['-', '.'])
        .chars()
        .take(MAX_SLUG_LEN)
        .collect()
}

/// File name holding the entry for `key`
pub fn key_to_file_name(key: &str) -> String {
    let hash = blake3::hash(key.as_bytes()).to_hex();
    format!(
        "{}-{}.{}",
        key_to_slug(key),
        &hash[..KEY_HASH_LEN],
        ENTRY_EXTENSION
    )
}

/// Whether `name` is an entry file (or a pending write) of [`FileCacheStore`]
///
/// Matches `<slug>-<12 hex>.json` and `<slug>-<12 hex>.tmp`.
pub fn is_store_file_name(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    if ext != ENTRY_EXTENSION && ext != TEMP_EXTENSION {
        return false;
    }
    stem.rsplit_once('-').is_some_and(|(_, suffix)| {
        suffix.len() == KEY_HASH_LEN
            && suffix.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    })
}

/// Cache store keeping one JSON file per key
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the default cache directory (see [`super::cache_dir`])
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(super::cache_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key_to_file_name(key))
    }

    /// Entry count and on-disk size of the cache directory
    pub fn stats(&self) -> Result<CacheStats> {
        stats::cache_stats(&self.dir)
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn init(&self) -> bool {
        match fs::create_dir_all(&self.dir).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cache directory unavailable");
                false
            }
        }
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> bool {
        let content = match serde_json::to_vec(&entry) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return false;
            }
        };

        if !self.init().await {
            return false;
        }

        // Write then rename so readers never observe a half-written entry
        let path = self.entry_path(key);
        let temp_path = path.with_extension(TEMP_EXTENSION);
        let result: std::io::Result<()> = async {
            fs::write(&temp_path, &content).await?;
            fs::rename(&temp_path, &path).await
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to write cache entry");
                let _ = fs::remove_file(&temp_path).await;
                false
            }
        }
    }

    async fn remove(&self, key: &str) -> bool {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to remove cache entry");
                false
            }
        }
    }

    /// Delete every entry file; other files in the directory are left alone
    async fn clear(&self) -> bool {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return true,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to clear cache");
                return false;
            }
        };

        let mut cleared = true;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "failed to list cache");
                    return false;
                }
            };
            if !entry.file_name().to_str().is_some_and(is_store_file_name) {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "failed to remove cache entry"
                    );
                    cleared = false;
                }
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_to_slug() {
        assert_eq!(key_to_slug("feed:RipeStore"), "feed-RipeStore");
        assert_eq!(
            key_to_slug("normalized:https://example.com/apps/repo.json"),
            "normalized-example.com-apps-repo.json"
        );
    }

    #[test]
    fn test_file_names_differ_for_colliding_slugs() {
        assert_eq!(key_to_slug("feed:a/b"), key_to_slug("feed:a?b"));
        assert_ne!(key_to_file_name("feed:a/b"), key_to_file_name("feed:a?b"));
    }

    #[test]
    fn test_long_keys_are_truncated() {
        let key = format!("feed:https://example.com/{}", "x".repeat(500));
        let name = key_to_file_name(&key);
        assert!(name.len() <= MAX_SLUG_LEN + KEY_HASH_LEN + 6);
    }

    #[tokio::test]
    async fn test_round_trip_and_stats() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path().join("cache"));

        assert!(store.get("feed:a").await.is_none());
        let entry = CacheEntry::new(json!({"apps": [{"name": "A"}]})).with_content_hash("blake3:1");
        assert!(store.set("feed:a", entry.clone()).await);
        assert_eq!(store.get("feed:a").await, Some(entry));

        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 1);
        assert!(stats.total_size > 0);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path());

        store.set("a", CacheEntry::new(json!(1))).await;
        store.set("b", CacheEntry::new(json!(2))).await;

        assert!(store.remove("a").await);
        assert!(!store.remove("a").await);
        assert!(store.get("b").await.is_some());

        assert!(store.clear().await);
        assert!(store.get("b").await.is_none());
        assert!(store.clear().await);
    }

    #[test]
    fn test_store_file_names() {
        assert!(is_store_file_name(&key_to_file_name("feed:RipeStore")));
        assert!(is_store_file_name(&key_to_file_name("")));
        assert!(is_store_file_name("feed-a-0123456789ab.tmp"));
        assert!(!is_store_file_name("settings.json"));
        assert!(!is_store_file_name("notes-0123456789ab.txt"));
        assert!(!is_store_file_name("feed-a-0123456789AB.json"));
        assert!(!is_store_file_name("feed-a-0123.json"));
    }

    #[tokio::test]
    async fn test_clear_keeps_foreign_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path());
        std::fs::write(temp.path().join("settings.json"), b"{}").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"keep me").unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();

        store.set("feed:a", CacheEntry::new(json!(1))).await;
        store.set("normalized:a", CacheEntry::new(json!(2))).await;
        assert_eq!(store.stats().unwrap().entries, 2);

        assert!(store.clear().await);
        assert!(store.get("feed:a").await.is_none());
        assert!(store.get("normalized:a").await.is_none());
        assert!(temp.path().join("settings.json").exists());
        assert!(temp.path().join("notes.txt").exists());
        assert!(temp.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileCacheStore::new(temp.path());
        std::fs::write(temp.path().join(key_to_file_name("feed:a")), b"{not json").unwrap();

        assert!(store.get("feed:a").await.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_medium_degrades() {
        let temp = tempfile::TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let store = FileCacheStore::new(blocker.join("cache"));

        assert!(!store.init().await);
        assert!(!store.set("feed:a", CacheEntry::new(json!(1))).await);
        assert!(store.get("feed:a").await.is_none());
        assert!(!store.remove("feed:a").await);
    }
}
