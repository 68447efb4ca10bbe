//! Field extraction rules
//!
//! Feeds spell the same logical field many ways. Each [`FieldRule`] lists the accepted keys
//! in priority order; the first key holding a non-empty value wins. Adding an alias is a
//! one-line change to the table below.

use serde_json::{Map, Value as JsonValue};

pub type Record = Map<String, JsonValue>;

/// Ordered alias keys for one logical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

// App record fields
pub const BUNDLE_ID: FieldRule = FieldRule {
    field: "bundleIdentifier",
    aliases: &["bundleIdentifier", "bundleID", "bundle", "id"],
};
pub const NAME: FieldRule = FieldRule {
    field: "name",
    aliases: &["name", "title"],
};
pub const ICON: FieldRule = FieldRule {
    field: "icon",
    aliases: &["iconURL", "icon", "image"],
};
pub const DEVELOPER: FieldRule = FieldRule {
    field: "developerName",
    aliases: &["developerName", "dev", "developer"],
};
pub const DESCRIPTION: FieldRule = FieldRule {
    field: "description",
    aliases: &["localizedDescription", "description", "subtitle"],
};
pub const SUBTITLE: FieldRule = FieldRule {
    field: "subtitle",
    aliases: &["subtitle"],
};
pub const CATEGORY: FieldRule = FieldRule {
    field: "category",
    aliases: &["category"],
};
pub const TINT_COLOR: FieldRule = FieldRule {
    field: "tintColor",
    aliases: &["tintColor"],
};
pub const SIZE: FieldRule = FieldRule {
    field: "size",
    aliases: &["size"],
};
pub const MIN_OS_VERSION: FieldRule = FieldRule {
    field: "minOSVersion",
    aliases: &["minOSVersion"],
};
pub const SCREENSHOTS: FieldRule = FieldRule {
    field: "screenshots",
    aliases: &["screenshots", "screenshotURLs"],
};
pub const PERMISSIONS: FieldRule = FieldRule {
    field: "permissions",
    aliases: &["appPermissions", "permissions"],
};
pub const VERSIONS: FieldRule = FieldRule {
    field: "versions",
    aliases: &["versions"],
};
/// Record-level version used when a record has no version list
pub const TOP_LEVEL_VERSION: FieldRule = FieldRule {
    field: "version",
    aliases: &["version", "latest"],
};

// Version entry fields
pub const VERSION: FieldRule = FieldRule {
    field: "version",
    aliases: &["version", "build", "tag"],
};
pub const RELEASE_DATE: FieldRule = FieldRule {
    field: "releaseDate",
    aliases: &["fullDate", "versionDate", "date", "published"],
};
pub const RELEASE_NOTES: FieldRule = FieldRule {
    field: "releaseNotes",
    aliases: &["localizedDescription", "changelog", "notes"],
};
pub const DOWNLOAD_URL: FieldRule = FieldRule {
    field: "downloadURL",
    aliases: &["downloadURL", "down", "url", "ipa", "download"],
};

// Screenshot and permission entries
pub const SCREENSHOT_URL: FieldRule = FieldRule {
    field: "url",
    aliases: &["url", "imageURL"],
};
pub const PERMISSION_NAME: FieldRule = FieldRule {
    field: "name",
    aliases: &["name"],
};
pub const PERMISSION_TEXT: FieldRule = FieldRule {
    field: "text",
    aliases: &["usageDescription", "description"],
};

// News fields
pub const NEWS_TITLE: FieldRule = FieldRule {
    field: "title",
    aliases: &["title"],
};
pub const NEWS_CAPTION: FieldRule = FieldRule {
    field: "caption",
    aliases: &["caption"],
};
pub const NEWS_DATE: FieldRule = FieldRule {
    field: "date",
    aliases: &["date"],
};
pub const NEWS_IMAGE: FieldRule = FieldRule {
    field: "imageURL",
    aliases: &["imageURL"],
};
pub const NEWS_LINK: FieldRule = FieldRule {
    field: "linkURL",
    aliases: &["url"],
};
pub const NEWS_APP: FieldRule = FieldRule {
    field: "relatedBundleIdentifier",
    aliases: &["appID"],
};
pub const NEWS_IDENTIFIER: FieldRule = FieldRule {
    field: "dedupeKey",
    aliases: &["identifier"],
};
pub const NEWS_NOTIFY: FieldRule = FieldRule {
    field: "notify",
    aliases: &["notify"],
};

// Feed-level fields
pub const FEED_NAME: FieldRule = FieldRule {
    field: "name",
    aliases: &["name", "repoName"],
};
/// Feed a featured reference object points at
pub const FEATURED_FEED: FieldRule = FieldRule {
    field: "feedId",
    aliases: &["feedId", "source"],
};

/// Coerce a scalar to text; blank strings, containers and null are "empty"
fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_present(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null | JsonValue::Bool(false) => false,
        JsonValue::String(s) => !s.is_empty(),
        _ => true,
    }
}

impl FieldRule {
    /// First non-empty scalar, as text
    pub fn text(&self, record: &Record) -> Option<String> {
        self.aliases
            .iter()
            .filter_map(|key| record.get(*key))
            .find_map(scalar_text)
    }

    /// Every distinct non-empty scalar across the aliases, in alias order
    pub fn all_texts(&self, record: &Record) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for text in self
            .aliases
            .iter()
            .filter_map(|key| record.get(*key))
            .filter_map(scalar_text)
        {
            if !found.contains(&text) {
                found.push(text);
            }
        }
        found
    }

    /// First present value of any type
    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a JsonValue> {
        self.aliases
            .iter()
            .filter_map(|key| record.get(*key))
            .find(|value| is_present(value))
    }

    /// First value usable as a byte count
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn size(&self, record: &Record) -> Option<u64> {
        self.aliases
            .iter()
            .filter_map(|key| record.get(*key))
            .find_map(|value| match value {
                JsonValue::Number(n) => n.as_u64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                }),
                JsonValue::String(s) => s.trim().parse().ok(),
                _ => None,
            })
    }

    /// First boolean value
    pub fn flag(&self, record: &Record) -> Option<bool> {
        self.aliases
            .iter()
            .filter_map(|key| record.get(*key))
            .find_map(JsonValue::as_bool)
    }

    /// First non-empty array
    pub fn list<'a>(&self, record: &'a Record) -> Option<&'a Vec<JsonValue>> {
        self.aliases
            .iter()
            .filter_map(|key| record.get(*key))
            .filter_map(JsonValue::as_array)
            .find(|list| !list.is_empty())
    }
}
