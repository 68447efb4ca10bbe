//! Featured app references

use serde::{Deserialize, Serialize};

/// Reference to a featured app
///
/// A scoped reference pins the feed it was featured by, which disambiguates apps that
/// share a bundle identifier across feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeaturedRef {
    Bare(String),
    #[serde(rename_all = "camelCase")]
    Scoped {
        bundle_identifier: String,
        feed_id: String,
    },
}

impl FeaturedRef {
    pub fn bundle_identifier(&self) -> &str {
        match self {
            FeaturedRef::Bare(bundle) => bundle,
            FeaturedRef::Scoped {
                bundle_identifier, ..
            } => bundle_identifier,
        }
    }

    /// Feed the reference is pinned to, if any
    pub fn feed_id(&self) -> Option<&str> {
        match self {
            FeaturedRef::Bare(_) => None,
            FeaturedRef::Scoped { feed_id, .. } => Some(feed_id),
        }
    }

    /// Whether this reference points at an app with the given identity
    pub fn matches(&self, bundle_identifier: &str, source_feed_id: &str) -> bool {
        self.bundle_identifier() == bundle_identifier
            && self.feed_id().is_none_or(|feed| feed == source_feed_id)
    }
}
