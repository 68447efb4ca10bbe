//! Common test utilities for appfeeds integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use appfeeds::error::{Result, feed};
use appfeeds::{
    Aggregator, AggregatorConfig, MemoryCacheStore, StaticSourceRegistry, Transport,
};
use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

/// Base URL feed names resolve against in tests
pub const BASE_URL: &str = "https://feeds.test/";

/// Install a log subscriber honoring `RUST_LOG`, once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
}

/// Transport serving canned bodies per URL and counting requests
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn respond(&self, url: &str, body: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Body(body.into()));
    }

    pub fn respond_json(&self, url: &str, body: &JsonValue) {
        self.respond(url, body.to_string());
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Status(status));
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        let reply = self.replies.lock().unwrap().get(url).cloned();
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(feed::http_status(url, status)),
            None => Err(feed::transport_failed(url, "connection refused")),
        }
    }
}

/// URL a feed name resolves to
pub fn feed_url(name: &str) -> String {
    format!("{}{}.json", BASE_URL, name)
}

/// An aggregator wired to a scripted transport and an in-memory cache
pub struct TestAggregator {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryCacheStore>,
    pub aggregator: Aggregator,
}

impl TestAggregator {
    pub fn new(feed_ids: &[&str]) -> Self {
        Self::with_config(feed_ids, test_config())
    }

    pub fn with_config(feed_ids: &[&str], config: AggregatorConfig) -> Self {
        Self::with_store(feed_ids, config, Arc::new(MemoryCacheStore::new()))
    }

    /// Share a cache store with an earlier aggregator, as a new session would
    pub fn with_store(
        feed_ids: &[&str],
        config: AggregatorConfig,
        store: Arc<MemoryCacheStore>,
    ) -> Self {
        let transport = Arc::new(ScriptedTransport::default());
        let registry = Arc::new(StaticSourceRegistry::new(feed_ids.iter().copied()));
        let aggregator = Aggregator::new(transport.clone(), store.clone(), registry, config);
        Self {
            transport,
            store,
            aggregator,
        }
    }
}

pub fn test_config() -> AggregatorConfig {
    AggregatorConfig {
        feed_base_url: BASE_URL.to_string(),
        ..AggregatorConfig::default()
    }
}

/// AltStore-style feed body
pub fn altstore_feed(name: &str, apps: JsonValue) -> JsonValue {
    json!({ "name": name, "apps": apps })
}

/// One app record with a single dated version
pub fn app_record(bundle: &str, name: &str, version: &str, url: &str, date: &str) -> JsonValue {
    json!({
        "bundleID": bundle,
        "name": name,
        "versions": [{ "version": version, "downloadURL": url, "date": date }],
    })
}

/// Age a cache entry by `by_ms` milliseconds
pub async fn age_entry(store: &MemoryCacheStore, key: &str, by_ms: i64) {
    use appfeeds::CacheStore;

    let mut entry = store.peek(key).expect("cache entry to age");
    entry.timestamp -= by_ms;
    store.set(key, entry).await;
}

/// Longer than the default cache TTL
pub const PAST_TTL_MS: i64 = 16 * 60 * 1000;
