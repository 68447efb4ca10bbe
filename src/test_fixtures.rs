//! Test fixtures shared by the unit tests.
//!
//! Provides a scripted [`Transport`] that serves canned bodies per URL and counts calls, plus
//! a few sample feed payloads in the shapes the normalizer understands.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::ScriptedTransport;
//!
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.respond("https://a/repo.json", r#"{"apps": []}"#);
//! transport.fail("https://b/repo.json", 503);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use crate::error::{Result, feed};
use crate::fetch::Transport;

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
}

/// Transport answering from a per-URL script
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url` from now on
    pub fn respond(&self, url: &str, body: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Body(body.into()));
    }

    /// Answer `url` with an HTTP error status from now on
    pub fn fail(&self, url: &str, status: u16) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Status(status));
    }

    /// Number of requests made for `url`
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Number of requests made for any URL
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
            None => Err(feed::transport_failed(url, "no scripted reply")),
        }
    }
}

/// AltStore-style feed with one app and one version
pub fn altstore_feed(bundle: &str, name: &str, version: &str, url: &str, date: &str) -> JsonValue {
    json!({
        "name": format!("{} Repo", name),
        "apps": [{
            "bundleIdentifier": bundle,
            "name": name,
            "developerName": "Dev",
            "iconURL": format!("https://icons.example.com/{}.png", name),
            "versions": [{
                "version": version,
                "downloadURL": url,
                "date": date,
            }],
        }],
    })
}
