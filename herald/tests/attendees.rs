mod helpers;

use std::time::Duration;

use helpers::*;
use herald::{
    CacheQuotaOrdering, CoreEvent, HeraldError, QuotaConfig, RateLimitInfo, SearchQuery,
    UpstreamResponse,
};
use herald_mock::{MockBehavior, MockSocialProvider, fixtures};
use tokio::time::Instant;
use tokio_test::assert_ok;

const EVENT: &str = "RustConf 2024";

fn remaining(f: &Fixture) -> u64 {
    f.herald
        .social_caller()
        .quota()
        .state(QuotaConfig::SEARCH_RECENT)
        .expect("search_recent is tracked")
        .remaining
}

#[tokio::test]
async fn attendees_are_scored_and_ordered_best_first() {
    let f = fixture();
    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);

    assert_eq!(
        names(&report.items, |a| a.username.as_str()),
        vec!["@ada", "@linus", "@grace"]
    );
    assert_eq!(report.requested_limit, 10);
    assert_eq!((report.cached, report.fresh), (0, 3));
    assert!(report.warnings.is_empty());

    let ada = &report.items[0];
    assert!((ada.confidence - 0.95).abs() < 1e-9);
    assert_eq!(ada.name, "Ada Lovelace");
    assert_eq!(ada.source_url, "https://twitter.com/ada/status/1002");
    assert_eq!(ada.posted_by, "@ada");
    let grace = &report.items[2];
    assert!((grace.confidence - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn search_query_is_cleaned_and_sized_from_the_limit() {
    let f = fixture();
    assert_ok!(f.herald.discover_attendees("Rust-Conf!! 2024", 10).await);
    assert_ok!(f.herald.discover_attendees(EVENT, 2).await);
    assert_ok!(f.herald.discover_attendees(EVENT, 1_000).await);

    let queries = f.social.queries();
    assert_eq!(
        queries[0],
        SearchQuery::new(
            "\"RustConf 2024\" OR attending \"RustConf 2024\" -is:retweet",
            30
        )
    );
    // 2 * 3 is raised to the minimum page size
    assert_eq!(queries[1].max_results, 10);
    // 1000 is capped at 30 attendees, i.e. 90 posts
    assert_eq!(queries[2].max_results, 90);
}

#[tokio::test]
async fn limits_are_capped_and_results_truncated() {
    let f = fixture();
    let capped = assert_ok!(f.herald.discover_attendees(EVENT, 100).await);
    assert_eq!(capped.requested_limit, 30);

    let f = fixture();
    let two = assert_ok!(f.herald.discover_attendees(EVENT, 2).await);
    assert_eq!(names(&two.items, |a| a.username.as_str()), vec!["@ada", "@linus"]);
    assert_eq!(two.fresh, 2);
}

#[tokio::test]
async fn name_without_word_characters_makes_no_call() {
    let f = fixture();
    let report = assert_ok!(f.herald.discover_attendees("!!! ???", 10).await);
    assert!(report.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(f.social.calls(), 0);
    assert_eq!(remaining(&f), 450);
}

#[tokio::test]
async fn non_operational_provider_short_circuits() {
    let f = fixture_with(config(), MockSocialProvider::not_operational());
    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);

    assert!(report.is_empty());
    assert_eq!(
        report.warnings,
        vec![HeraldError::not_operational("herald-mock-social")]
    );
    assert_eq!(f.social.calls(), 0);
    assert_eq!(remaining(&f), 450);
    assert_eq!(
        f.observer
            .count(|e| matches!(e, CoreEvent::NotOperational { .. })),
        1
    );
    assert!(!f.herald.status().social_operational);
}

#[tokio::test]
async fn repeat_request_is_served_from_cache() {
    let f = fixture();
    assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    let again = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);

    assert_eq!(f.social.calls(), 1);
    assert_eq!((again.cached, again.fresh), (3, 0));
    // quota-first ordering charges the hit as well
    assert_eq!(remaining(&f), 448);
}

#[tokio::test]
async fn cache_first_ordering_makes_repeats_free() {
    let mut cfg = config();
    cfg.ordering = CacheQuotaOrdering::CacheFirst;
    let f = fixture_with(cfg, MockSocialProvider::new());
    assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert_eq!(remaining(&f), 449);
}

#[tokio::test]
async fn cached_page_expires_after_ttl() {
    let f = fixture();
    assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    f.clock.advance(Duration::from_secs(30 * 60));
    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert_eq!(f.social.calls(), 2);
    assert_eq!(report.fresh, 3);
}

#[tokio::test]
async fn bad_request_becomes_a_warning_after_one_call() {
    let f = fixture();
    let rejected = HeraldError::bad_request(QuotaConfig::SEARCH_RECENT, "invalid query");
    f.social.push_failure(rejected.clone());

    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert!(report.is_empty());
    assert_eq!(report.warnings, vec![rejected]);
    assert_eq!(f.social.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn throttling_is_retried_once_then_reported() {
    let f = fixture();
    let throttled = HeraldError::too_many_requests(QuotaConfig::SEARCH_RECENT);
    f.social.push_failure(throttled.clone());
    f.social.push_failure(throttled.clone());

    let started = Instant::now();
    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert_eq!(started.elapsed(), Duration::from_secs(2));
    assert_eq!(report.warnings, vec![throttled]);
    assert_eq!(f.social.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_on_retry() {
    let f = fixture();
    f.social
        .push_failure(HeraldError::connector("herald-mock-social", "reset by peer"));

    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert_eq!(report.len(), 3);
    assert!(report.warnings.is_empty());
    assert_eq!(f.social.calls(), 2);
}

#[tokio::test]
async fn rate_limit_headers_refresh_the_tracker() {
    let f = fixture();
    f.social.push(MockBehavior::Return(
        UpstreamResponse::new(fixtures::posts::conference_page()).with_rate_limit(
            RateLimitInfo {
                limit: Some(180),
                remaining: Some(12),
                reset_epoch_secs: None,
            },
        ),
    ));
    assert_ok!(f.herald.discover_attendees(EVENT, 10).await);

    let state = f
        .herald
        .status()
        .quotas
        .remove(QuotaConfig::SEARCH_RECENT)
        .expect("tracked");
    assert_eq!((state.limit, state.remaining), (180, 12));
}

#[tokio::test]
async fn empty_page_yields_empty_report_without_warning() {
    let f = fixture();
    f.social.push(MockBehavior::Return(UpstreamResponse::new(
        fixtures::posts::empty_page(),
    )));
    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert!(report.is_empty());
    assert!(report.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_discoveries_overlap_their_upstream_latency() {
    let f = fixture_with(
        config(),
        MockSocialProvider::new().with_latency(Duration::from_secs(3)),
    );
    let started = Instant::now();
    let (a, b) = tokio::join!(
        f.herald.discover_attendees(EVENT, 10),
        f.herald.discover_attendees("EuroRust 2024", 10),
    );
    assert_ok!(a);
    assert_ok!(b);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(f.social.calls(), 2);
    assert_eq!(remaining(&f), 448);
}

#[tokio::test(start_paused = true)]
async fn abandoned_search_spends_quota_but_caches_nothing() {
    let f = fixture();
    f.social.push(MockBehavior::Hang);

    let outcome =
        tokio::time::timeout(Duration::from_secs(5), f.herald.discover_attendees(EVENT, 10)).await;
    assert!(outcome.is_err());
    assert_eq!(remaining(&f), 449);
    assert_eq!(f.herald.status().response_cache_entries, 0);

    let report = assert_ok!(f.herald.discover_attendees(EVENT, 10).await);
    assert_eq!((report.cached, report.fresh), (0, 3));
    assert_eq!(f.social.calls(), 2);
}
