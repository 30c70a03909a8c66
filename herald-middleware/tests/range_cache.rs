use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use herald_core::{CoreEvent, EventListing, HeraldError, RangeCacheConfig};
use herald_middleware::{DateRange, FreshRequest, RangeCache};
use herald_mock::RecordingObserver;
use herald_mock::fixtures::events::listing;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

fn cache() -> RangeCache<EventListing> {
    RangeCache::new(RangeCacheConfig::default())
}

#[test]
fn inverted_range_is_rejected() {
    assert!(matches!(
        DateRange::new(d(2024, 2, 1), d(2024, 1, 1)),
        Err(HeraldError::InvalidArg(_))
    ));
    assert!(DateRange::new(d(2024, 1, 1), d(2024, 1, 1)).is_ok());
}

#[test]
fn overlap_is_inclusive_at_both_ends() {
    let jan = range(d(2024, 1, 1), d(2024, 1, 31));
    assert!(jan.overlaps(&range(d(2024, 1, 15), d(2024, 2, 15))));
    assert!(jan.overlaps(&range(d(2024, 1, 31), d(2024, 2, 5))));
    assert!(jan.overlaps(&range(d(2023, 12, 1), d(2024, 1, 1))));
    assert!(!jan.overlaps(&range(d(2024, 2, 1), d(2024, 2, 5))));
}

#[test]
fn cached_hits_are_limited_to_query_and_stored_range() {
    let c = cache();
    let stored = range(d(2024, 1, 1), d(2024, 1, 31));
    c.store(
        "Austin",
        stored,
        vec![
            listing("Early", "Austin", d(2024, 1, 10)),
            listing("Mid", "Austin", d(2024, 1, 20)),
            // outside the stored range, dropped on store
            listing("Stray", "Austin", d(2024, 2, 1)),
        ],
    );
    assert_eq!(c.stats().groups["Austin"].total_items, 2);
    let hits = c.cached_items("Austin", range(d(2024, 1, 15), d(2024, 2, 15)));
    let names: Vec<_> = hits.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Mid"]);
    assert!(c.cached_items("Berlin", stored).is_empty());
}

#[tokio::test]
async fn fresh_fetch_asks_only_for_the_shortfall() {
    let c = cache();
    let q = range(d(2024, 1, 1), d(2024, 1, 31));
    c.store(
        "Austin",
        q,
        vec![
            listing("A", "Austin", d(2024, 1, 2)),
            listing("B", "Austin", d(2024, 1, 3)),
            listing("C", "Austin", d(2024, 1, 4)),
        ],
    );

    let seen = std::sync::Mutex::new(None);
    let out = c
        .fetch("Austin", q, 5, |req: FreshRequest| {
            *seen.lock().unwrap() = Some(req.clone());
            async move {
                Ok(vec![
                    listing("D", "Austin", d(2024, 1, 5)),
                    listing("E", "Austin", d(2024, 1, 6)),
                ])
            }
        })
        .await;

    let req = seen.lock().unwrap().clone().unwrap();
    assert_eq!(req.needed, 2);
    assert_eq!(req.group, "Austin");
    assert_eq!(out.items.len(), 5);
    assert_eq!((out.cached, out.fresh), (3, 2));
    assert!(out.error.is_none());
}

#[tokio::test]
async fn full_hit_skips_fresh_fetch() {
    let c = cache();
    let q = range(d(2024, 1, 1), d(2024, 1, 31));
    c.store(
        "Austin",
        q,
        (1..=4)
            .map(|i| listing(&format!("Show {i}"), "Austin", d(2024, 1, i)))
            .collect(),
    );
    let calls = AtomicUsize::new(0);
    let out = c
        .fetch("Austin", q, 3, |_req| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Vec::new()) }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(out.items.len(), 3);
    assert_eq!(out.cached, 3);
}

#[tokio::test]
async fn duplicates_collapse_and_cached_copy_wins() {
    let c = cache();
    let q = range(d(2024, 1, 1), d(2024, 1, 31));
    let mut cached = listing("Jazz Night", "Austin", d(2024, 1, 5));
    cached.venue = "cached venue".into();
    c.store("Austin", q, vec![cached]);

    let out = c
        .fetch("Austin", q, 5, |_req| async {
            let mut dup = listing("  jazz NIGHT ", "Austin", d(2024, 1, 5));
            dup.venue = "fresh venue".into();
            Ok(vec![dup, listing("Jazz Night", "Austin", d(2024, 1, 6))])
        })
        .await;

    assert_eq!(out.items.len(), 2);
    assert_eq!(out.items[0].venue, "cached venue");
    assert_eq!(out.items[1].date, d(2024, 1, 6));
    assert_eq!((out.cached, out.fresh), (1, 1));
}

#[tokio::test]
async fn fresh_failure_is_reported_not_propagated() {
    let observer = Arc::new(RecordingObserver::new());
    let c = cache().with_observer(observer.clone());
    let q = range(d(2024, 1, 1), d(2024, 1, 31));
    c.store("Austin", q, vec![listing("Kept", "Austin", d(2024, 1, 9))]);

    let out = c
        .fetch("Austin", q, 4, |_req| async {
            Err(HeraldError::connector("serp", "timeout"))
        })
        .await;
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.error, Some(HeraldError::connector("serp", "timeout")));
    assert_eq!(
        observer.count(|e| matches!(e, CoreEvent::FreshFetchFailed { .. })),
        1
    );
    // nothing new was stored
    assert_eq!(c.keys("Austin").len(), 1);
}

#[tokio::test]
async fn empty_fresh_result_is_not_stored() {
    let c = cache();
    let q = range(d(2024, 3, 1), d(2024, 3, 31));
    let out = c.fetch("Austin", q, 5, |_req| async { Ok(Vec::new()) }).await;
    assert!(out.items.is_empty());
    assert!(c.keys("Austin").is_empty());
    assert_eq!(c.stats().total_groups(), 0);
}

#[tokio::test]
async fn fresh_items_outside_the_query_range_are_discarded() {
    let c = cache();
    let jan = range(d(2024, 1, 1), d(2024, 1, 31));
    let out = c
        .fetch("Austin", jan, 5, |_req| async {
            Ok(vec![
                listing("Summer Fair", "Austin", d(2024, 6, 1)),
                listing("Jazz Concert", "Austin", d(2024, 1, 15)),
            ])
        })
        .await;
    let names: Vec<_> = out.items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Jazz Concert"]);
    assert_eq!(out.fresh, 1);
    assert_eq!(c.stats().groups["Austin"].total_items, 1);

    // nothing in range: nothing stored
    let june = range(d(2024, 6, 1), d(2024, 6, 30));
    let out = c
        .fetch("Berlin", june, 5, |_req| async {
            Ok(vec![listing("Winter Festival", "Berlin", d(2024, 1, 5))])
        })
        .await;
    assert!(out.items.is_empty());
    assert!(c.keys("Berlin").is_empty());
}

#[test]
fn sixth_range_evicts_the_oldest() {
    let observer = Arc::new(RecordingObserver::new());
    let c = cache().with_observer(observer.clone());
    for i in 1..=6 {
        let day = d(2024, i, 1);
        c.store("Austin", range(day, day), vec![listing("E", "Austin", day)]);
    }
    let keys = c.keys("Austin");
    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|k| k.range.start() != d(2024, 1, 1)));
    assert_eq!(keys[0].range.start(), d(2024, 2, 1));
    assert_eq!(
        observer.count(|e| matches!(e, CoreEvent::RangeEvicted { .. })),
        1
    );
    // other groups are unaffected
    assert!(c.keys("Berlin").is_empty());
}

#[test]
fn restoring_a_key_replaces_items_and_keeps_position() {
    let c = cache();
    let first = range(d(2024, 1, 1), d(2024, 1, 31));
    let second = range(d(2024, 2, 1), d(2024, 2, 29));
    c.store("Austin", first, vec![listing("Old", "Austin", d(2024, 1, 3))]);
    c.store("Austin", second, vec![listing("Feb", "Austin", d(2024, 2, 3))]);
    c.store(
        "Austin",
        first,
        vec![
            listing("New", "Austin", d(2024, 1, 4)),
            listing("Newer", "Austin", d(2024, 1, 5)),
        ],
    );

    let keys = c.keys("Austin");
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].range, first);
    let names: Vec<_> = c
        .cached_items("Austin", first)
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["New", "Newer"]);

    let stats = c.stats();
    assert_eq!(stats.groups["Austin"].cached_ranges, 2);
    assert_eq!(stats.groups["Austin"].total_items, 3);

    c.clear();
    assert_eq!(c.stats().total_groups(), 0);
}

#[test]
fn bound_is_configurable() {
    let c: RangeCache<EventListing> = RangeCache::new(RangeCacheConfig {
        max_ranges_per_group: 2,
    });
    for i in 1..=3 {
        let day = d(2024, 1, i);
        c.store("Berlin", range(day, day), vec![listing("E", "Berlin", day)]);
    }
    assert_eq!(c.keys("Berlin").len(), 2);
}
