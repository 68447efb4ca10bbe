//! Batch aggregation tests

mod common;

use appfeeds::cache::{feed_key, normalized_key};
use appfeeds::config::aggregator::DEFAULT_MASTER_CACHE_KEY;
use appfeeds::{CacheStore, FeaturedRef, NormalizedFeed};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_same_app_across_two_feeds_merges() {
    init_tracing();
    let t = TestAggregator::new(&["A", "B"]);
    t.transport.respond_json(
        &feed_url("A"),
        &json!({"apps": [{"bundleID": "com.x.y", "name": "X", "versions": [
            {"version": "1.0", "downloadURL": "http://a/1.ipa", "date": "2024-01-01"}
        ]}]}),
    );
    t.transport.respond_json(
        &feed_url("B"),
        &json!({"apps": [{"bundleID": "com.x.y", "name": "X Pro", "versions": [
            {"version": "1.1", "downloadURL": "http://b/2.ipa", "date": "2024-02-01"}
        ]}]}),
    );

    let result = t.aggregator.aggregate_all().await;

    assert_eq!(result.apps.len(), 1);
    let app = &result.apps[0];
    assert_eq!(app.bundle_identifier, "com.x.y");
    assert_eq!(app.name, "X");
    let versions: Vec<(&str, &str)> = app
        .versions
        .iter()
        .map(|v| (v.version.as_str(), v.release_date.as_deref().unwrap_or_default()))
        .collect();
    assert_eq!(versions, vec![("1.1", "2024-02-01"), ("1.0", "2024-01-01")]);
    assert_eq!(app.current_version, "1.1");
    assert!(result.partial_failures.is_empty());
}

#[tokio::test]
async fn test_second_call_within_ttl_makes_no_requests() {
    let t = TestAggregator::new(&["A", "B"]);
    t.transport
        .respond_json(&feed_url("A"), &altstore_feed("A", json!([app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")])));
    t.transport
        .respond_json(&feed_url("B"), &altstore_feed("B", json!([app_record("com.b", "B", "1", "http://b/1.ipa", "2024-01-01")])));

    let first = t.aggregator.aggregate_all().await;
    let calls = t.transport.total_calls();
    assert_eq!(calls, 2);

    let second = t.aggregator.aggregate_all().await;
    assert_eq!(t.transport.total_calls(), calls);
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_master_cache_requires_identical_feed_list() {
    let first = TestAggregator::new(&["A", "B"]);
    first.transport.respond_json(&feed_url("A"), &json!([]));
    first.transport.respond_json(&feed_url("B"), &json!([]));
    first.aggregator.aggregate_all().await;

    // Same feeds in another order: the fingerprint differs
    let reordered = TestAggregator::with_store(&["B", "A"], test_config(), first.store.clone());
    reordered.aggregator.aggregate_all().await;

    let master = first.store.peek(DEFAULT_MASTER_CACHE_KEY).unwrap();
    assert_eq!(master.feed_ids, Some(vec!["B".to_string(), "A".to_string()]));
    // Feeds themselves were still fresh, so nothing was requested
    assert_eq!(reordered.transport.total_calls(), 0);
}

#[tokio::test]
async fn test_records_without_bundle_identifier_are_excluded() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &json!([
            {"name": "NoId", "downloadURL": "http://x/a.ipa"},
            {"bundleIdentifier": "com.ok", "name": "Ok", "downloadURL": "http://x/ok.ipa"},
        ]),
    );

    let result = t.aggregator.aggregate_all().await;
    let names: Vec<&str> = result.apps.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Ok"]);
}

#[tokio::test]
async fn test_version_without_url_yields_empty_current_version() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &json!({"apps": [{"bundleIdentifier": "com.x", "name": "X", "versions": [{"version": "2.0"}]}]}),
    );

    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps.len(), 1);
    assert!(result.apps[0].versions.is_empty());
    assert_eq!(result.apps[0].current_version, "");
}

#[tokio::test]
async fn test_failed_feed_is_reported_and_skipped() {
    let t = TestAggregator::new(&["A", "Broken"]);
    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")])),
    );
    t.transport.fail(&feed_url("Broken"), 500);

    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps.len(), 1);
    assert_eq!(result.partial_failures.len(), 1);
    assert_eq!(result.partial_failures[0].feed_id, "Broken");
    assert!(result.partial_failures[0].reason.contains("500"));

    // Failures are not part of the cached aggregate
    let cached = t.aggregator.aggregate_all().await;
    assert!(cached.partial_failures.is_empty());
    assert_eq!(cached.apps, result.apps);
}

#[tokio::test]
async fn test_all_feeds_failing_yields_empty_result() {
    let t = TestAggregator::new(&["A", "B"]);

    let result = t.aggregator.aggregate_all().await;
    assert!(result.is_empty());
    assert_eq!(result.partial_failures.len(), 2);
}

#[tokio::test]
async fn test_news_filtered_and_deduplicated() {
    let t = TestAggregator::new(&["A", "B"]);
    t.transport.respond_json(
        &feed_url("A"),
        &json!({
            "apps": [app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")],
            "news": [
                {"title": "A 1.0", "appID": "com.a", "date": "2024-01-01"},
                {"title": "Gone", "appID": "com.gone", "date": "2024-01-01"},
                {"title": "Welcome", "identifier": "welcome"},
            ],
            "featuredApps": ["com.a", "com.a"],
        }),
    );
    t.transport.respond_json(
        &feed_url("B"),
        &json!({
            "apps": [],
            "news": [
                {"title": "A 1.0 (mirror)", "appID": "com.a", "date": "2024-01-01"},
                {"title": "Welcome again", "identifier": "welcome"},
            ],
        }),
    );

    let result = t.aggregator.aggregate_all().await;
    let titles: Vec<&str> = result.news.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["A 1.0", "Welcome"]);
    assert_eq!(
        result.featured,
        vec![FeaturedRef::Scoped {
            bundle_identifier: "com.a".to_string(),
            feed_id: feed_url("A"),
        }]
    );
}

#[tokio::test]
async fn test_unchanged_feed_reuses_normalized_cache() {
    let t = TestAggregator::new(&["A"]);
    let body = altstore_feed("A", json!([app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")]));
    t.transport.respond_json(&feed_url("A"), &body);
    t.aggregator.aggregate_all().await;

    // Mark the normalized entry so a reuse is observable
    let key = normalized_key("A");
    let mut entry = t.store.peek(&key).unwrap();
    let mut feed: NormalizedFeed = serde_json::from_value(entry.payload.clone()).unwrap();
    feed.apps[0].name = "From normalized cache".to_string();
    entry.payload = serde_json::to_value(&feed).unwrap();
    t.store.set(&key, entry).await;

    age_entry(&t.store, &feed_key("A"), PAST_TTL_MS).await;
    assert!(t.aggregator.invalidate().await);

    let result = t.aggregator.aggregate_all().await;
    assert_eq!(t.transport.calls(&feed_url("A")), 2);
    assert_eq!(result.apps[0].name, "From normalized cache");
}

#[tokio::test]
async fn test_forced_fetch_between_passes_is_picked_up() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "Old", "1", "http://a/1.ipa", "2024-01-01")])),
    );
    t.aggregator.aggregate_all().await;

    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "New", "2", "http://a/2.ipa", "2024-02-01")])),
    );
    assert!(t.aggregator.fetch_feed("A", true).await.unwrap().changed);

    // Raw payload is fresh, so this pass sees no change from the fetcher itself
    age_entry(&t.store, DEFAULT_MASTER_CACHE_KEY, PAST_TTL_MS).await;
    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps[0].name, "New");
    assert_eq!(result.apps[0].current_version, "2");

    // Revalidating the same bytes later must not bring the old records back
    age_entry(&t.store, &feed_key("A"), PAST_TTL_MS).await;
    age_entry(&t.store, DEFAULT_MASTER_CACHE_KEY, PAST_TTL_MS).await;
    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps[0].name, "New");
    assert_eq!(result.apps[0].current_version, "2");
}

#[tokio::test]
async fn test_missing_normalized_entry_is_rebuilt() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")])),
    );
    t.aggregator.aggregate_all().await;

    assert!(t.store.remove(&normalized_key("A")).await);
    t.aggregator.invalidate().await;

    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps.len(), 1);
    let rebuilt = t.store.peek(&normalized_key("A")).unwrap();
    assert_eq!(
        rebuilt.content_hash,
        t.store.peek(&feed_key("A")).unwrap().content_hash
    );
}

#[tokio::test]
async fn test_changed_feed_is_normalized_again() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "Old", "1", "http://a/1.ipa", "2024-01-01")])),
    );
    t.aggregator.aggregate_all().await;

    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "New", "2", "http://a/2.ipa", "2024-02-01")])),
    );
    age_entry(&t.store, &feed_key("A"), PAST_TTL_MS).await;
    age_entry(&t.store, DEFAULT_MASTER_CACHE_KEY, PAST_TTL_MS).await;

    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps[0].name, "New");
    assert_eq!(result.apps[0].current_version, "2");
}

#[tokio::test]
async fn test_nothing_changed_refreshes_master_entry() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")])),
    );
    let first = t.aggregator.aggregate_all().await;

    age_entry(&t.store, &feed_key("A"), PAST_TTL_MS).await;
    age_entry(&t.store, DEFAULT_MASTER_CACHE_KEY, PAST_TTL_MS).await;
    let stale_stamp = t.store.peek(DEFAULT_MASTER_CACHE_KEY).unwrap().timestamp;

    let second = t.aggregator.aggregate_all().await;
    assert_eq!(t.transport.calls(&feed_url("A")), 2);
    assert_eq!(second, first);
    assert!(t.store.peek(DEFAULT_MASTER_CACHE_KEY).unwrap().timestamp > stale_stamp);
}

#[tokio::test]
async fn test_stale_feed_served_when_origin_fails() {
    let t = TestAggregator::new(&["A"]);
    t.transport.respond_json(
        &feed_url("A"),
        &altstore_feed("A", json!([app_record("com.a", "A", "1", "http://a/1.ipa", "2024-01-01")])),
    );
    t.aggregator.aggregate_all().await;

    t.transport.fail(&feed_url("A"), 503);
    age_entry(&t.store, &feed_key("A"), PAST_TTL_MS).await;
    t.aggregator.invalidate().await;

    let result = t.aggregator.aggregate_all().await;
    assert_eq!(result.apps.len(), 1);
    assert!(result.partial_failures.is_empty());
}

#[tokio::test]
async fn test_fetch_feed_surfaces_errors() {
    let t = TestAggregator::new(&[]);
    t.transport.fail(&feed_url("Missing"), 404);

    let err = t.aggregator.fetch_feed("Missing", false).await.unwrap_err();
    assert!(matches!(err, appfeeds::FeedsError::HttpStatus { status: 404, .. }));

    let err = t.aggregator.fetch_feed("   ", false).await.unwrap_err();
    assert!(matches!(err, appfeeds::FeedsError::InvalidFeedId { .. }));
}

#[tokio::test]
async fn test_no_configured_feeds() {
    let t = TestAggregator::new(&[]);
    let result = t.aggregator.aggregate_all().await;
    assert!(result.is_empty());
    assert!(result.partial_failures.is_empty());
}
