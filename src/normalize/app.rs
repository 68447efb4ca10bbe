//! App record normalization

use serde_json::Value as JsonValue;

use super::FeedContext;
use super::media;
use super::rules::{self, Record};
use crate::domain::{App, Version};

/// Name used when a record has neither a name nor a bundle identifier
const UNKNOWN_NAME: &str = "Unknown";

/// Whether a raw element qualifies as an app candidate
///
/// Any non-empty bundle alias qualifies, even one that trims to nothing; such a record
/// becomes an unkeyed app.
pub fn is_candidate(record: &Record) -> bool {
    rules::BUNDLE_ID
        .aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .any(|value| match value {
            JsonValue::String(s) => !s.is_empty(),
            JsonValue::Number(_) => true,
            _ => false,
        })
}

/// Normalize one version entry; entries without a download URL are dropped
fn version_entry(entry: &Record, ctx: &FeedContext<'_>) -> Option<Version> {
    let download_url = rules::DOWNLOAD_URL.text(entry)?;
    Some(Version {
        version: rules::VERSION.text(entry).unwrap_or_default(),
        release_date: rules::RELEASE_DATE.text(entry),
        release_notes: rules::RELEASE_NOTES.text(entry),
        download_url,
        size_bytes: rules::SIZE.size(entry),
        min_os_version: rules::MIN_OS_VERSION.text(entry),
        origin_feed_id: ctx.origin_url.to_string(),
        origin_feed_display_name: ctx.display_name(),
    })
}

/// Versions declared by a record
///
/// Uses the explicit version list when it yields any entry with a download URL; otherwise
/// synthesizes one entry from the record's own version and URL fields.
fn versions(record: &Record, ctx: &FeedContext<'_>) -> Vec<Version> {
    let listed: Vec<Version> = rules::VERSIONS
        .list(record)
        .map(|list| {
            list.iter()
                .filter_map(JsonValue::as_object)
                .filter_map(|entry| version_entry(entry, ctx))
                .collect()
        })
        .unwrap_or_default();
    if !listed.is_empty() {
        return listed;
    }

    rules::DOWNLOAD_URL
        .text(record)
        .map(|download_url| Version {
            version: rules::TOP_LEVEL_VERSION.text(record).unwrap_or_default(),
            release_date: None,
            release_notes: None,
            download_url,
            size_bytes: rules::SIZE.size(record),
            min_os_version: rules::MIN_OS_VERSION.text(record),
            origin_feed_id: ctx.origin_url.to_string(),
            origin_feed_display_name: ctx.display_name(),
        })
        .into_iter()
        .collect()
}

/// Normalize one raw app record
///
/// Returns `None` when the element is not an app candidate. `category_fallback` is the
/// bucket name the record was found under, for categorized feeds.
pub fn app_from_record(
    record: &Record,
    ctx: &FeedContext<'_>,
    category_fallback: Option<&str>,
) -> Option<App> {
    if !is_candidate(record) {
        return None;
    }

    let bundle_identifier = rules::BUNDLE_ID
        .text(record)
        .map(|b| b.trim().to_string())
        .unwrap_or_default();

    let name = rules::NAME
        .text(record)
        .or_else(|| Some(bundle_identifier.clone()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let icon_urls = rules::ICON.all_texts(record);
    let icon = icon_urls.first().cloned().unwrap_or_default();

    let versions = versions(record, ctx);
    let current_version = match versions.first() {
        Some(latest) => latest.version.clone(),
        None => rules::TOP_LEVEL_VERSION.text(record).unwrap_or_default(),
    };

    Some(App {
        name,
        bundle_identifier,
        icon,
        icon_urls,
        developer_name: rules::DEVELOPER.text(record).unwrap_or_default(),
        description: rules::DESCRIPTION.text(record).unwrap_or_default(),
        subtitle: rules::SUBTITLE.text(record).unwrap_or_default(),
        category: rules::CATEGORY
            .text(record)
            .or_else(|| category_fallback.map(ToString::to_string))
            .unwrap_or_default(),
        tint_color: rules::TINT_COLOR.text(record),
        size_bytes: rules::SIZE.size(record),
        min_os_version: rules::MIN_OS_VERSION.text(record),
        screenshots: media::screenshots(rules::SCREENSHOTS.value(record)),
        permissions: media::permissions(record),
        entitlements: media::entitlements(record),
        versions,
        source_feed_id: ctx.origin_url.to_string(),
        source_feed_display_name: ctx.display_name(),
        contributing_feed_ids: Vec::new(),
        current_version,
    })
}
