//! Schema normalization
//!
//! Converts one raw feed payload into unified [`App`], [`NewsItem`] and [`FeaturedRef`]
//! records. Three payload shapes are recognized, tried in order:
//!
//! 1. **App list**: a bare array; every element is an app candidate
//! 2. **Apps object**: an object with an `apps` array, plus optional `news`, `featuredApps`
//!    and a top-level `name`
//! 3. **Categorized object**: every other array-valued property is a category bucket whose
//!    name becomes the fallback category; `meta`, `info` and `news` keys are skipped
//!
//! Elements without any bundle-identifier alias are not apps and are dropped silently.
//! Normalization never fails: anything unrecognized simply contributes nothing.

pub mod app;
pub mod media;
pub mod news;
pub mod rules;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::{App, FeaturedRef, NewsItem};
use rules::Record;

/// Keys of a categorized feed that never hold apps
const METADATA_KEYS: &[&str] = &["meta", "info", "news"];

/// Feed a record was read from
#[derive(Debug, Clone, Copy)]
pub struct FeedContext<'a> {
    /// Resolved feed URL, recorded as the origin of every record
    pub origin_url: &'a str,
    pub display_name: Option<&'a str>,
}

impl FeedContext<'_> {
    fn display_name(&self) -> Option<String> {
        self.display_name.map(ToString::to_string)
    }
}

/// Everything one feed contributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFeed {
    pub apps: Vec<App>,
    pub news: Vec<NewsItem>,
    pub featured: Vec<FeaturedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_display_name: Option<String>,
}

/// Recognized payload shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedShape {
    AppList,
    AppsObject,
    Categorized,
}

impl FeedShape {
    pub fn detect(payload: &JsonValue) -> Option<Self> {
        match payload {
            JsonValue::Array(_) => Some(FeedShape::AppList),
            JsonValue::Object(obj) if obj.get("apps").is_some_and(JsonValue::is_array) => {
                Some(FeedShape::AppsObject)
            }
            JsonValue::Object(_) => Some(FeedShape::Categorized),
            _ => None,
        }
    }
}

fn is_metadata_key(key: &str) -> bool {
    METADATA_KEYS.iter().any(|m| key.eq_ignore_ascii_case(m))
}

fn push_apps<'a>(
    out: &mut Vec<App>,
    elements: impl IntoIterator<Item = &'a JsonValue>,
    ctx: &FeedContext<'_>,
    category_fallback: Option<&str>,
) {
    out.extend(
        elements
            .into_iter()
            .filter_map(JsonValue::as_object)
            .filter_map(|record| app::app_from_record(record, ctx, category_fallback)),
    );
}

/// Display name of a categorized feed, read from its metadata object
fn categorized_display_name(obj: &Record) -> Option<String> {
    obj.iter()
        .filter(|(key, _)| is_metadata_key(key))
        .filter_map(|(_, value)| value.as_object())
        .find_map(|meta| rules::FEED_NAME.text(meta))
}

/// Normalize one raw feed payload fetched from `origin_url`
pub fn normalize(payload: &JsonValue, origin_url: &str) -> NormalizedFeed {
    let mut feed = NormalizedFeed::default();

    match (FeedShape::detect(payload), payload) {
        (Some(FeedShape::AppList), JsonValue::Array(elements)) => {
            let ctx = FeedContext {
                origin_url,
                display_name: None,
            };
            push_apps(&mut feed.apps, elements, &ctx, None);
        }
        (Some(FeedShape::AppsObject), JsonValue::Object(obj)) => {
            feed.feed_display_name = rules::FEED_NAME.text(obj);
            let ctx = FeedContext {
                origin_url,
                display_name: feed.feed_display_name.as_deref(),
            };

            if let Some(apps) = obj.get("apps").and_then(JsonValue::as_array) {
                push_apps(&mut feed.apps, apps, &ctx, None);
            }
            if let Some(items) = obj.get("news").and_then(JsonValue::as_array) {
                feed.news = items.iter().filter_map(|n| news::news_item(n, &ctx)).collect();
            }
            if let Some(refs) = obj.get("featuredApps").and_then(JsonValue::as_array) {
                feed.featured = refs
                    .iter()
                    .filter_map(|r| news::featured_ref(r, &ctx))
                    .collect();
            }
        }
        (Some(FeedShape::Categorized), JsonValue::Object(obj)) => {
            feed.feed_display_name = categorized_display_name(obj);
            let ctx = FeedContext {
                origin_url,
                display_name: feed.feed_display_name.as_deref(),
            };

            for (bucket, value) in obj {
                if is_metadata_key(bucket) {
                    continue;
                }
                if let Some(elements) = value.as_array() {
                    push_apps(&mut feed.apps, elements, &ctx, Some(bucket.as_str()));
                }
            }
        }
        _ => {
            tracing::debug!(url = origin_url, "payload is neither an array nor an object");
        }
    }

    tracing::debug!(
        url = origin_url,
        apps = feed.apps.len(),
        news = feed.news.len(),
        featured = feed.featured.len(),
        "normalized feed"
    );
    feed
}
