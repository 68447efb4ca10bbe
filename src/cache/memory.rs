//! In-process cache store

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CacheEntry, CacheStore};

/// Cache store that keeps entries in a map for the lifetime of the process
///
/// A poisoned lock behaves like an unavailable medium.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of stored keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Synchronous read, for inspecting state outside an async context
    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.peek(key)
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> bool {
        match self.entries.lock() {
            Ok(mut map) => {
                map.insert(key.to_string(), entry);
                true
            }
            Err(_) => false,
        }
    }

    async fn remove(&self, key: &str) -> bool {
        match self.entries.lock() {
            Ok(mut map) => map.remove(key).is_some(),
            Err(_) => false,
        }
    }

    async fn clear(&self) -> bool {
        match self.entries.lock() {
            Ok(mut map) => {
                map.clear();
                true
            }
            Err(_) => false,
        }
    }
}
