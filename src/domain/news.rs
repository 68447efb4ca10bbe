//! News domain types

use serde::{Deserialize, Serialize};

/// A news item published by a feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, rename = "linkURL", skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    /// Bundle identifier of the app this item talks about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_bundle_identifier: Option<String>,
    /// Feed-provided identifier, used for de-duplication when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedupe_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(default)]
    pub origin_feed_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_feed_display_name: Option<String>,
}

impl NewsItem {
    /// Signature two items must share to be considered the same announcement
    ///
    /// The feed identifier wins; otherwise `<appID or title>|<date>`.
    pub fn signature(&self) -> String {
        if let Some(key) = self.dedupe_key.as_deref().filter(|k| !k.is_empty()) {
            return key.to_string();
        }
        let subject = self
            .related_bundle_identifier
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.title);
        format!("{}|{}", subject, self.date.as_deref().unwrap_or_default())
    }

    /// Related bundle identifier, ignoring blank values
    pub fn related_app(&self) -> Option<&str> {
        self.related_bundle_identifier
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}
