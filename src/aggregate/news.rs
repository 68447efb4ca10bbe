//! News and featured post-processing

use std::collections::HashSet;

use crate::domain::{App, FeaturedRef, NewsItem};

/// De-duplicate news, then drop items about apps that did not survive the merge
///
/// The first item with a given signature wins, even if a later duplicate names an app that
/// survived. Items that name no app are always kept.
pub fn finalize_news(news: Vec<NewsItem>, apps: &[App]) -> Vec<NewsItem> {
    let bundles: HashSet<&str> = apps
        .iter()
        .map(|app| app.bundle_identifier.as_str())
        .filter(|b| !b.is_empty())
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    news.into_iter()
        .filter(|item| seen.insert(item.signature()))
        .filter(|item| item.related_app().is_none_or(|b| bundles.contains(b)))
        .collect()
}

/// Drop repeated featured references, keeping first-seen order
pub fn dedupe_featured(featured: Vec<FeaturedRef>) -> Vec<FeaturedRef> {
    let mut seen: HashSet<FeaturedRef> = HashSet::new();
    featured
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
