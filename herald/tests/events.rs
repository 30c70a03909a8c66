mod helpers;

use helpers::*;
use herald::{CategoryFilter, CoreEvent, EventCategory, EventQuery, HeraldError};
use proptest::prelude::*;
use tokio_test::{assert_err, assert_ok};

fn austin(start: (u32, u32), end: (u32, u32), max: usize) -> EventQuery {
    EventQuery::new(
        "Austin",
        date(2024, start.0, start.1),
        date(2024, end.0, end.1),
    )
    .max_results(max)
}

fn event_names(report: &herald::DiscoveryReport<herald::EventListing>) -> Vec<String> {
    names(&report.items, |e| e.name.as_str())
}

#[tokio::test]
async fn first_request_fetches_fresh_and_stores_the_range() {
    let f = fixture();
    let report = assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);

    assert_eq!(
        event_names(&report),
        vec!["Jazz Concert", "Tech Summit", "Food Truck Rally"]
    );
    assert_eq!((report.cached, report.fresh), (0, 3));
    assert_eq!(f.events.calls(), 1);

    let request = &f.events.requests()[0];
    assert_eq!(request.location, "Austin");
    assert_eq!(request.count, 3);
    assert_eq!(request.category, CategoryFilter::All);

    let stats = f.herald.status().range_cache;
    assert_eq!(stats.groups["Austin"].cached_ranges, 1);
    assert_eq!(stats.groups["Austin"].total_items, 3);
}

#[tokio::test]
async fn covered_request_is_served_without_a_call() {
    let f = fixture();
    assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);
    let again = assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);

    assert_eq!(f.events.calls(), 1);
    assert_eq!((again.cached, again.fresh), (3, 0));
    assert_eq!(
        event_names(&again),
        vec!["Jazz Concert", "Tech Summit", "Food Truck Rally"]
    );
}

#[tokio::test]
async fn overlapping_request_fetches_only_the_shortfall() {
    let f = fixture();
    assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);

    // only Food Truck Rally (Jan 20) of the stored range lies inside Jan 15..Feb 15
    let report = assert_ok!(f.herald.discover_events(&austin((1, 15), (2, 15), 4)).await);
    assert_eq!(f.events.requests()[1].count, 3);
    // the fresh batch repeats Food Truck Rally; the cached copy wins
    assert_eq!(
        event_names(&report),
        vec!["Food Truck Rally", "Marathon Race", "Gallery Night"]
    );
    assert_eq!((report.cached, report.fresh), (1, 2));
}

#[tokio::test]
async fn limits_are_capped() {
    let f = fixture();
    let report = assert_ok!(f.herald.discover_events(&austin((1, 1), (2, 29), 50)).await);
    assert_eq!(report.requested_limit, 20);
    assert_eq!(f.events.requests()[0].count, 20);
    assert_eq!(report.len(), 7);
}

#[tokio::test]
async fn first_category_shapes_the_fetch() {
    let f = fixture();
    let query = austin((1, 1), (2, 29), 5)
        .category(CategoryFilter::Only(EventCategory::Sports))
        .category(CategoryFilter::Only(EventCategory::Music));
    let report = assert_ok!(f.herald.discover_events(&query).await);

    assert_eq!(
        f.events.requests()[0].category,
        CategoryFilter::Only(EventCategory::Sports)
    );
    assert_eq!(event_names(&report), vec!["Marathon Race"]);
}

#[tokio::test]
async fn inverted_range_is_rejected_before_any_call() {
    let f = fixture();
    let err = assert_err!(f.herald.discover_events(&austin((2, 1), (1, 1), 5)).await);
    assert!(matches!(err, HeraldError::InvalidArg(_)));
    assert_eq!(f.events.calls(), 0);
}

#[tokio::test]
async fn blank_location_is_rejected() {
    let f = fixture();
    let query = EventQuery::new("  ", date(2024, 1, 1), date(2024, 1, 31));
    let err = assert_err!(f.herald.discover_events(&query).await);
    assert!(matches!(err, HeraldError::InvalidArg(_)));
}

#[tokio::test]
async fn fetch_failure_is_a_warning_and_nothing_is_stored() {
    let f = fixture();
    let down = HeraldError::connector("herald-mock-events", "HTTP 503");
    f.events.fail_next(down.clone());

    let report = assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);
    assert!(report.is_empty());
    assert_eq!(report.warnings, vec![down]);
    assert_eq!(
        f.observer
            .count(|e| matches!(e, CoreEvent::FreshFetchFailed { .. })),
        1
    );
    assert_eq!(f.herald.status().range_cache.total_groups(), 0);

    // nothing cached, so the next request goes upstream again
    let retry = assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);
    assert_eq!(retry.fresh, 3);
    assert_eq!(f.events.calls(), 2);
}

#[tokio::test]
async fn failure_after_partial_hit_keeps_cached_items() {
    let f = fixture();
    assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);
    f.events
        .fail_next(HeraldError::connector("herald-mock-events", "timeout"));

    let report = assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 5)).await);
    assert_eq!(report.len(), 3);
    assert_eq!((report.cached, report.fresh), (3, 0));
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn offline_provider_serves_stored_listings_without_a_call() {
    let f = fixture();
    assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);
    f.events.set_operational(false);

    let report = assert_ok!(f.herald.discover_events(&austin((1, 15), (2, 15), 5)).await);
    assert_eq!(event_names(&report), vec!["Food Truck Rally"]);
    assert_eq!((report.cached, report.fresh), (1, 0));
    assert_eq!(
        report.warnings,
        vec![HeraldError::not_operational("herald-mock-events")]
    );
    assert_eq!(f.events.calls(), 1);
    assert_eq!(
        f.observer
            .count(|e| matches!(e, CoreEvent::NotOperational { .. })),
        1
    );

    f.events.set_operational(true);
    assert_ok!(f.herald.discover_events(&austin((1, 15), (2, 15), 5)).await);
    assert_eq!(f.events.calls(), 2);
}

#[tokio::test]
async fn groups_are_independent() {
    let f = fixture();
    assert_ok!(f.herald.discover_events(&austin((1, 1), (1, 31), 3)).await);
    let berlin = EventQuery::new("Berlin", date(2024, 1, 1), date(2024, 1, 31)).max_results(3);
    let report = assert_ok!(f.herald.discover_events(&berlin).await);

    assert_eq!(report.cached, 0);
    assert_eq!(
        event_names(&report),
        vec!["Winter Festival", "Techno DJ Set"]
    );
    assert_eq!(f.herald.status().range_cache.total_groups(), 2);
}

#[tokio::test]
async fn oldest_ranges_are_evicted_per_group() {
    let f = fixture();
    for day in 1..=6 {
        let query = EventQuery::new("Austin", date(2024, 1, day), date(2024, 2, 29)).max_results(20);
        assert_ok!(f.herald.discover_events(&query).await);
    }
    let keys = f.herald.range_cache().keys("Austin");
    assert_eq!(keys.len(), 5);
    assert_eq!(keys[0].range.start(), date(2024, 1, 2));
    assert_eq!(
        f.observer
            .count(|e| matches!(e, CoreEvent::RangeEvicted { .. })),
        1
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reports_respect_caps_range_and_uniqueness(
        start in 0u32..60,
        len in 0u32..40,
        max in 0usize..60,
        repeat in any::<bool>(),
    ) {
        let f = fixture();
        let from = date(2024, 1, 1) + chrono::Days::new(u64::from(start));
        let to = from + chrono::Days::new(u64::from(len));
        let query = EventQuery::new("Austin", from, to).max_results(max);

        let runs = if repeat { 2 } else { 1 };
        for _ in 0..runs {
            let report = tokio_test::block_on(f.herald.discover_events(&query))
                .expect("valid query");
            prop_assert_eq!(report.requested_limit, max.min(20));
            prop_assert!(report.len() <= report.requested_limit);
            prop_assert_eq!(report.cached + report.fresh, report.len());
            prop_assert!(report.items.iter().all(|e| from <= e.date && e.date <= to));
            let mut seen = std::collections::HashSet::new();
            prop_assert!(report.items.iter().all(|e| seen.insert((e.name.clone(), e.date))));
        }
    }
}
