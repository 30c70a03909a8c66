//! Date-range aware result cache.
//!
//! Results are stored per group (e.g. a location) under the date range they
//! were fetched for. A lookup serves whatever overlapping stored ranges hold
//! for the query range and asks the fresh-fetch function only for the
//! shortfall. Each group keeps its most recent ranges in insertion order and
//! evicts the oldest first.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use herald_core::dedup::identity_key;
use herald_core::{
    CoreEvent, GroupCacheStats, HeraldError, NoopObserver, Observer, RangeCacheConfig,
    RangeCacheStats, RangeItem,
};

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range.
    ///
    /// # Errors
    /// Returns `HeraldError::InvalidArg` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, HeraldError> {
        if start > end {
            return Err(HeraldError::InvalidArg(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A single-day range.
    #[must_use]
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// First day.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when the two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(other.end < self.start || other.start > self.end)
    }

    /// True when `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Composite key of a stored range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeKey {
    /// Group the range belongs to.
    pub group: String,
    /// The stored range.
    pub range: DateRange,
}

/// Argument handed to the fresh-fetch function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshRequest {
    /// Group being fetched.
    pub group: String,
    /// Query range.
    pub range: DateRange,
    /// Number of items the cache could not serve.
    pub needed: usize,
}

/// Outcome of [`RangeCache::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFetch<T> {
    /// Deduplicated items, at most the requested count; cached items first.
    pub items: Vec<T>,
    /// Items in `items` served from stored ranges.
    pub cached: usize,
    /// Items in `items` obtained by the fresh fetch.
    pub fresh: usize,
    /// Failure of the fresh fetch, if it ran and failed.
    pub error: Option<HeraldError>,
}

struct GroupEntries<T> {
    order: VecDeque<DateRange>,
    items: HashMap<DateRange, Vec<T>>,
}

impl<T> Default for GroupEntries<T> {
    fn default() -> Self {
        Self {
            order: VecDeque::new(),
            items: HashMap::new(),
        }
    }
}

/// Partial-hit cache of dated items keyed by group and date range.
pub struct RangeCache<T> {
    max_ranges: usize,
    groups: Mutex<HashMap<String, GroupEntries<T>>>,
    observer: Arc<dyn Observer>,
}

impl<T> RangeCache<T>
where
    T: RangeItem + Clone + Send + Sync,
{
    /// Create an empty cache keeping at most `max_ranges_per_group` ranges per group
    /// (never fewer than one).
    pub fn new(config: RangeCacheConfig) -> Self {
        Self {
            max_ranges: config.max_ranges_per_group.max(1),
            groups: Mutex::new(HashMap::new()),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report lookups, stores and evictions to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, GroupEntries<T>>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve `range` for `group` from stored ranges, fetching only the shortfall.
    ///
    /// `fresh` runs only when stored ranges hold fewer than `max_results`
    /// matching items; fresh items dated outside `range` are discarded. Its failure is reported in [`RangeFetch::error`] and
    /// otherwise treated as zero new items.
    pub async fn fetch<F, Fut>(
        &self,
        group: &str,
        range: DateRange,
        max_results: usize,
        fresh: F,
    ) -> RangeFetch<T>
    where
        F: FnOnce(FreshRequest) -> Fut,
        Fut: Future<Output = Result<Vec<T>, HeraldError>>,
    {
        let cached = self.cached_items(group, range);
        let needed = max_results.saturating_sub(cached.len());
        self.observer.observe(&CoreEvent::RangeLookup {
            group: group.to_string(),
            cached: cached.len(),
            needed,
        });

        let mut error = None;
        let mut fetched = Vec::new();
        if needed > 0 {
            let request = FreshRequest {
                group: group.to_string(),
                range,
                needed,
            };
            match fresh(request).await {
                Ok(items) => {
                    let items: Vec<T> = items
                        .into_iter()
                        .filter(|item| range.contains(item.date()))
                        .collect();
                    if !items.is_empty() {
                        self.store(group, range, items.clone());
                    }
                    fetched = items;
                }
                Err(e) => {
                    self.observer.observe(&CoreEvent::FreshFetchFailed {
                        group: group.to_string(),
                        error: e.clone(),
                    });
                    error = Some(e);
                }
            }
        }

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(max_results.min(cached.len() + fetched.len()));
        let mut from_cache = 0;
        let mut from_fresh = 0;
        for (item, is_cached) in cached
            .into_iter()
            .map(|i| (i, true))
            .chain(fetched.into_iter().map(|i| (i, false)))
        {
            if items.len() >= max_results {
                break;
            }
            if !seen.insert(identity_key(&item)) {
                continue;
            }
            if is_cached {
                from_cache += 1;
            } else {
                from_fresh += 1;
            }
            items.push(item);
        }

        RangeFetch {
            items,
            cached: from_cache,
            fresh: from_fresh,
            error,
        }
    }

    /// Items of every stored range of `group` overlapping `range`, restricted to
    /// dates inside both the stored range and `range`.
    ///
    /// Stored ranges are visited oldest first.
    pub fn cached_items(&self, group: &str, range: DateRange) -> Vec<T> {
        let groups = self.lock();
        let Some(entries) = groups.get(group) else {
            return Vec::new();
        };
        entries
            .order
            .iter()
            .filter(|stored| stored.overlaps(&range))
            .filter_map(|stored| entries.items.get(stored).map(|items| (stored, items)))
            .flat_map(|(stored, items)| {
                items
                    .iter()
                    .filter(move |item| range.contains(item.date()) && stored.contains(item.date()))
            })
            .cloned()
            .collect()
    }

    /// Store `items` under `(group, range)`.
    ///
    /// Replaces the items of an existing key in place (its eviction position is
    /// unchanged); otherwise appends the range and evicts the group's oldest
    /// ranges beyond the bound. Items dated outside `range` are dropped; a batch
    /// left empty is ignored.
    pub fn store(&self, group: &str, range: DateRange, mut items: Vec<T>) {
        items.retain(|item| range.contains(item.date()));
        if items.is_empty() {
            return;
        }
        let count = items.len();
        let mut evicted = Vec::new();
        {
            let mut groups = self.lock();
            let entries = groups.entry(group.to_string()).or_default();
            if entries.items.insert(range, items).is_none() {
                entries.order.push_back(range);
                while entries.order.len() > self.max_ranges {
                    if let Some(oldest) = entries.order.pop_front() {
                        entries.items.remove(&oldest);
                        evicted.push(oldest);
                    }
                }
            }
        }

        self.observer.observe(&CoreEvent::RangeStored {
            group: group.to_string(),
            start: range.start,
            end: range.end,
            items: count,
        });
        for old in evicted {
            self.observer.observe(&CoreEvent::RangeEvicted {
                group: group.to_string(),
                start: old.start,
                end: old.end,
            });
        }
    }

    /// Stored keys of `group`, oldest first.
    pub fn keys(&self, group: &str) -> Vec<RangeKey> {
        self.lock()
            .get(group)
            .map(|entries| {
                entries
                    .order
                    .iter()
                    .map(|range| RangeKey {
                        group: group.to_string(),
                        range: *range,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Per-group usage.
    pub fn stats(&self) -> RangeCacheStats {
        let groups = self
            .lock()
            .iter()
            .filter(|(_, entries)| !entries.order.is_empty())
            .map(|(group, entries)| {
                (
                    group.clone(),
                    GroupCacheStats {
                        cached_ranges: entries.order.len(),
                        total_items: entries.items.values().map(Vec::len).sum(),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        RangeCacheStats { groups }
    }

    /// Drop every stored range.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T> std::fmt::Debug for RangeCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeCache")
            .field("max_ranges", &self.max_ranges)
            .finish_non_exhaustive()
    }
}
