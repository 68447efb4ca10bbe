//! Merge buckets
//!
//! A bucket accumulates the records that end up as one merged app. Each feed contributes at
//! most one record per bucket.

use std::collections::HashSet;

use crate::domain::{App, Version};
use crate::version;

/// One merged-or-unmerged app record under construction
#[derive(Debug, Clone)]
pub struct Bucket {
    record: App,
    /// Feeds already represented in this bucket, in first-seen order
    contributors: Vec<String>,
    seen_versions: HashSet<(String, String)>,
}

fn fill_text(target: &mut String, candidate: &str) {
    if target.is_empty() && !candidate.is_empty() {
        *target = candidate.to_string();
    }
}

fn fill_option<T: Clone>(target: &mut Option<T>, candidate: Option<&T>) {
    if target.is_none() {
        *target = candidate.cloned();
    }
}

fn fill_optional_text(target: &mut Option<String>, candidate: Option<&String>) {
    if target.as_deref().is_none_or(str::is_empty) {
        if let Some(value) = candidate.filter(|c| !c.is_empty()) {
            *target = Some(value.clone());
        }
    }
}

/// Append `url` to `urls` unless it is empty or already listed
pub fn push_unique(urls: &mut Vec<String>, url: &str) {
    if !url.is_empty() && !urls.iter().any(|u| u == url) {
        urls.push(url.to_string());
    }
}

impl Bucket {
    /// Open a bucket seeded by `app`
    pub fn new(mut app: App) -> Self {
        let contributors = app
            .contributing_feeds()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        let versions = std::mem::take(&mut app.versions);
        let icon_urls = std::mem::take(&mut app.icon_urls);

        let mut bucket = Self {
            record: app,
            contributors,
            seen_versions: HashSet::new(),
        };

        for url in &icon_urls {
            push_unique(&mut bucket.record.icon_urls, url);
        }
        let icon = bucket.record.icon.clone();
        push_unique(&mut bucket.record.icon_urls, &icon);
        bucket.add_versions(versions);
        bucket
    }

    /// Whether `app` comes from a feed this bucket already holds a record from
    pub fn shares_feed_with(&self, app: &App) -> bool {
        app.contributing_feeds()
            .iter()
            .any(|feed| self.contributors.iter().any(|c| c == feed))
    }

    /// Fold `app` into the bucket
    ///
    /// Scalars already set are kept, icon URLs accumulate, screenshots and permissions are only
    /// filled when missing, and versions are unioned by (version, URL) with first-seen winning.
    pub fn absorb(&mut self, app: App) {
        for feed in app.contributing_feeds() {
            if !self.contributors.iter().any(|c| c == feed) {
                self.contributors.push(feed.to_string());
            }
        }

        let record = &mut self.record;
        fill_text(&mut record.name, &app.name);
        fill_text(&mut record.icon, &app.icon);
        fill_text(&mut record.developer_name, &app.developer_name);
        fill_text(&mut record.description, &app.description);
        fill_text(&mut record.subtitle, &app.subtitle);
        fill_text(&mut record.category, &app.category);
        fill_optional_text(&mut record.tint_color, app.tint_color.as_ref());
        fill_optional_text(&mut record.min_os_version, app.min_os_version.as_ref());
        fill_option(&mut record.size_bytes, app.size_bytes.as_ref());

        for url in &app.icon_urls {
            push_unique(&mut record.icon_urls, url);
        }
        push_unique(&mut record.icon_urls, &app.icon);

        if record.screenshots.is_empty() && !app.screenshots.is_empty() {
            record.screenshots = app.screenshots;
        }
        fill_option(&mut record.permissions, app.permissions.as_ref());
        fill_option(&mut record.entitlements, app.entitlements.as_ref());

        self.add_versions(app.versions);
    }

    fn add_versions(&mut self, versions: Vec<Version>) {
        for version in versions {
            let (v, url) = version.dedupe_key();
            if self.seen_versions.insert((v.to_string(), url.to_string())) {
                self.record.versions.push(version);
            }
        }
    }

    /// Sort versions, derive the current version and record the contributing feeds
    pub fn finish(mut self) -> App {
        version::sort_versions(&mut self.record.versions);
        self.record.refresh_current_version();
        self.record.contributing_feed_ids = self.contributors;
        self.record
    }
}
