//! App domain types
//!
//! Contains the unified app record and the version entries it carries.

use serde::{Deserialize, Serialize};

/// Identity of an app as seen by the merge engine
///
/// Only `Keyed` apps take part in merging. An `Unkeyed` app is carried through standalone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppKey<'a> {
    Keyed(&'a str),
    Unkeyed,
}

/// Screenshot URLs split by device class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshots {
    #[serde(default)]
    pub phone_images: Vec<String>,
    #[serde(default)]
    pub tablet_images: Vec<String>,
}

impl Screenshots {
    pub fn is_empty(&self) -> bool {
        self.phone_images.is_empty() && self.tablet_images.is_empty()
    }
}

/// A declared privacy permission or entitlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub text: String,
}

/// One downloadable version of an app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Version string; may be empty
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    /// Download URL; entries without one never make it into a record
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_os_version: Option<String>,
    #[serde(default)]
    pub origin_feed_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_feed_display_name: Option<String>,
}

impl Version {
    /// Identity used to de-duplicate versions across feeds
    pub fn dedupe_key(&self) -> (&str, &str) {
        (self.version.as_str(), self.download_url.as_str())
    }
}

/// Unified app record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub name: String,
    /// Merge key; an empty identifier makes the app unkeyed
    #[serde(default)]
    pub bundle_identifier: String,
    /// Primary icon URL
    #[serde(default)]
    pub icon: String,
    /// Every distinct icon URL known for this app, for client-side fallthrough
    #[serde(default, rename = "iconURLs")]
    pub icon_urls: Vec<String>,
    #[serde(default)]
    pub developer_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_os_version: Option<String>,
    #[serde(default)]
    pub screenshots: Screenshots,
    /// `None` means the feed declared nothing, as opposed to an explicit empty list
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
    #[serde(default)]
    pub entitlements: Option<Vec<Permission>>,
    /// Newest first
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub source_feed_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_feed_display_name: Option<String>,
    /// Every feed merged into this record; empty until the record has been merged
    #[serde(default, rename = "contributingFeedIds", skip_serializing_if = "Vec::is_empty")]
    pub contributing_feed_ids: Vec<String>,
    /// Derived from `versions[0]`
    #[serde(default)]
    pub current_version: String,
}

impl App {
    /// Merge identity of this app
    pub fn key(&self) -> AppKey<'_> {
        let bundle = self.bundle_identifier.trim();
        if bundle.is_empty() {
            AppKey::Unkeyed
        } else {
            AppKey::Keyed(bundle)
        }
    }

    /// Newest version entry, if any
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.first()
    }

    /// Version string shown as current
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Recompute `current_version` from the (already sorted) version list
    ///
    /// Keeps the existing value when there are no versions, so a record's own top-level
    /// version survives when it never had a downloadable entry.
    pub fn refresh_current_version(&mut self) {
        if let Some(latest) = self.versions.first() {
            self.current_version = latest.version.clone();
        }
    }

    /// Feeds that contributed to this record, the record's own feed first
    ///
    /// Covers feeds recorded by an earlier merge and the origins of every version entry.
    pub fn contributing_feeds(&self) -> Vec<&str> {
        let mut feeds = vec![self.source_feed_id.as_str()];
        let recorded = self.contributing_feed_ids.iter().map(String::as_str);
        let origins = self.versions.iter().map(|v| v.origin_feed_id.as_str());
        for feed in recorded.chain(origins) {
            if !feed.is_empty() && !feeds.contains(&feed) {
                feeds.push(feed);
            }
        }
        feeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(v: &str, url: &str, origin: &str) -> Version {
        Version {
            version: v.to_string(),
            download_url: url.to_string(),
            origin_feed_id: origin.to_string(),
            ..Version::default()
        }
    }

    #[test]
    fn test_key_trims_bundle_identifier() {
        let app = App {
            bundle_identifier: "  com.example.app ".to_string(),
            ..App::default()
        };
        assert_eq!(app.key(), AppKey::Keyed("com.example.app"));
    }

    #[test]
    fn test_blank_bundle_is_unkeyed() {
        let app = App {
            bundle_identifier: "   ".to_string(),
            ..App::default()
        };
        assert_eq!(app.key(), AppKey::Unkeyed);
    }

    #[test]
    fn test_refresh_current_version_keeps_fallback_without_versions() {
        let mut app = App {
            current_version: "2.0".to_string(),
            ..App::default()
        };
        app.refresh_current_version();
        assert_eq!(app.current_version(), "2.0");

        app.versions.push(version("3.1", "https://a/3.1.ipa", "a"));
        app.refresh_current_version();
        assert_eq!(app.current_version(), "3.1");
    }

    #[test]
    fn test_contributing_feeds_deduplicates_origins() {
        let app = App {
            source_feed_id: "a".to_string(),
            versions: vec![
                version("2", "https://b/2.ipa", "b"),
                version("1", "https://a/1.ipa", "a"),
                version("0", "https://b/0.ipa", "b"),
            ],
            ..App::default()
        };
        assert_eq!(app.contributing_feeds(), vec!["a", "b"]);
    }

    #[test]
    fn test_contributing_feeds_include_recorded_feeds() {
        let app = App {
            source_feed_id: "a".to_string(),
            contributing_feed_ids: vec!["a".to_string(), "c".to_string()],
            versions: vec![version("1", "https://b/1.ipa", "b")],
            ..App::default()
        };
        assert_eq!(app.contributing_feeds(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let app = App {
            name: "X".to_string(),
            bundle_identifier: "com.x.y".to_string(),
            versions: vec![version("1.0", "http://a/1.ipa", "a")],
            ..App::default()
        };
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["bundleIdentifier"], "com.x.y");
        assert_eq!(json["versions"][0]["downloadURL"], "http://a/1.ipa");
        assert!(json["permissions"].is_null());
    }

    #[test]
    fn test_screenshots_is_empty() {
        let mut shots = Screenshots::default();
        assert!(shots.is_empty());
        shots.tablet_images.push("https://a/ipad.png".to_string());
        assert!(!shots.is_empty());
    }
}
