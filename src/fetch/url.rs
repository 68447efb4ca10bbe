//! Feed identifier resolution

use crate::error::{Result, feed};

/// Resolve a feed identifier to the URL it is fetched from
///
/// Identifiers that already carry a scheme pass through unchanged; anything else names a feed
/// under `base_url`, e.g. `RipeStore` becomes `<base_url>RipeStore.json`.
pub fn resolve_feed_url(feed_id: &str, base_url: &str) -> Result<String> {
    let feed_id = feed_id.trim();
    if feed_id.is_empty() {
        return Err(feed::invalid_id(feed_id));
    }

    if feed_id.contains("://") {
        return Ok(feed_id.to_string());
    }

    let separator = if base_url.is_empty() || base_url.ends_with('/') {
        ""
    } else {
        "/"
    };
    Ok(format!("{}{}{}.json", base_url, separator, feed_id))
}
