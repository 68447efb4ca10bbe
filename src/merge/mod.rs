//! Cross-feed app merging
//!
//! [`merge`] consolidates app records that share a bundle identifier.
//!
//! ## Grouping
//!
//! - Records without a bundle identifier are never merged and come first in the output.
//! - Records sharing a bundle identifier form a group. Within a group, a record joins the
//!   first bucket holding nothing from any of its feeds, otherwise it opens a new bucket. Two
//!   listings from the same feed therefore never collapse into one record.
//!
//! ## Field policy per bucket
//!
//! ```text
//! name, developer, description, subtitle,
//! category, tint, size, min OS             first non-empty value, earliest record first
//! icon URLs                                ordered union of every URL seen
//! screenshots, permissions, entitlements   taken only while still missing
//! versions                                 union by (version, URL), first seen wins,
//!                                          then sorted newest first
//! ```
//!
//! Groups that end with several buckets share their best icon and screenshots and one
//! combined icon fallback list (see [`inherit`]).
//!
//! Merging is idempotent: every merged record remembers the feeds folded into it, so merging
//! the output again rebuilds the same buckets. Output order beyond "unkeyed first" is not part
//! of the contract.

pub mod bucket;
pub mod inherit;

use std::collections::HashMap;

use crate::domain::{App, AppKey};
use bucket::Bucket;

/// Merge app records across feeds
pub fn merge(apps: Vec<App>) -> Vec<App> {
    let mut unkeyed: Vec<App> = Vec::new();
    let mut groups: Vec<Vec<Bucket>> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for app in apps {
        let key = match app.key() {
            AppKey::Keyed(bundle) => bundle.to_string(),
            AppKey::Unkeyed => {
                unkeyed.push(app);
                continue;
            }
        };

        let slot = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        let buckets = &mut groups[slot];

        match buckets.iter_mut().find(|b| !b.shares_feed_with(&app)) {
            Some(bucket) => bucket.absorb(app),
            None => buckets.push(Bucket::new(app)),
        }
    }

    let mut merged = unkeyed;
    for buckets in groups {
        let mut records: Vec<App> = buckets.into_iter().map(Bucket::finish).collect();
        inherit::share_presentation(&mut records);
        merged.extend(records);
    }

    tracing::debug!(records = merged.len(), "merged app records");
    merged
}
