//! News and featured-reference normalization

use serde_json::Value as JsonValue;

use super::FeedContext;
use super::rules;
use crate::domain::{FeaturedRef, NewsItem};

/// Normalize one news entry; non-object entries are dropped
pub fn news_item(value: &JsonValue, ctx: &FeedContext<'_>) -> Option<NewsItem> {
    let entry = value.as_object()?;
    Some(NewsItem {
        title: rules::NEWS_TITLE.text(entry).unwrap_or_default(),
        caption: rules::NEWS_CAPTION.text(entry),
        date: rules::NEWS_DATE.text(entry),
        image_url: rules::NEWS_IMAGE.text(entry),
        link_url: rules::NEWS_LINK.text(entry),
        related_bundle_identifier: rules::NEWS_APP.text(entry).map(|b| b.trim().to_string()),
        dedupe_key: rules::NEWS_IDENTIFIER.text(entry),
        notify: rules::NEWS_NOTIFY.flag(entry),
        origin_feed_id: ctx.origin_url.to_string(),
        tint_color: rules::TINT_COLOR.text(entry),
        origin_feed_display_name: ctx.display_name(),
    })
}

/// Normalize one `featuredApps` entry
///
/// A bare bundle identifier is pinned to the feed that featured it. An object may name the
/// bundle under any bundle alias and point at another feed.
pub fn featured_ref(value: &JsonValue, ctx: &FeedContext<'_>) -> Option<FeaturedRef> {
    let (bundle, feed) = match value {
        JsonValue::String(bundle) => (bundle.trim().to_string(), None),
        JsonValue::Object(obj) => (
            rules::BUNDLE_ID.text(obj)?.trim().to_string(),
            rules::FEATURED_FEED.text(obj),
        ),
        _ => return None,
    };
    if bundle.is_empty() {
        return None;
    }

    Some(FeaturedRef::Scoped {
        bundle_identifier: bundle,
        feed_id: feed.unwrap_or_else(|| ctx.origin_url.to_string()),
    })
}
