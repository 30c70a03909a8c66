use std::sync::Arc;

use chrono::NaiveDate;
use herald_core::{
    CategoryFilter, CoreEvent, DiscoveryReport, EventFetch, EventListing, HeraldError,
    dedup_by_name_and_date,
};
use herald_middleware::DateRange;
use serde::{Deserialize, Serialize};

use crate::Herald;

/// An event discovery request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Location to search in; also the range-cache group.
    pub location: String,
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
    /// Requested categories. Only the first is used; empty means all.
    #[serde(default)]
    pub categories: Vec<CategoryFilter>,
    /// Maximum number of events wanted (capped by `limits.max_events`).
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

const fn default_max_results() -> usize {
    10
}

impl EventQuery {
    /// Query for every category with the default limit of 10.
    pub fn new(location: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            location: location.into(),
            start,
            end,
            categories: Vec::new(),
            max_results: default_max_results(),
        }
    }

    /// Append a category.
    #[must_use]
    pub fn category(mut self, category: CategoryFilter) -> Self {
        self.categories.push(category);
        self
    }

    /// Set the result limit.
    #[must_use]
    pub const fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Category the upstream queries are shaped for.
    #[must_use]
    pub fn effective_category(&self) -> CategoryFilter {
        self.categories.first().copied().unwrap_or_default()
    }
}

impl Herald {
    /// Discover events in `query.location` within `[query.start, query.end]`.
    ///
    /// Behavior and trade-offs:
    /// - `max_results` is capped by `limits.max_events` (20 by default).
    /// - Listings stored for overlapping ranges of the same location are served
    ///   first; the provider is asked only for the shortfall, and nothing at
    ///   all when the stored ranges already cover the limit.
    /// - A provider failure is listed in `warnings`; cached listings are still
    ///   returned.
    /// - A missing or non-operational provider is never called; stored
    ///   listings are served with a `NotOperational` warning.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `start > end` or the location is blank.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "herald::discovery::events",
            skip(self, query),
            fields(
                location = %query.location,
                start = %query.start,
                end = %query.end,
                max_results = query.max_results,
            ),
        )
    )]
    pub async fn discover_events(
        &self,
        query: &EventQuery,
    ) -> Result<DiscoveryReport<EventListing>, HeraldError> {
        let range = DateRange::new(query.start, query.end)?;
        let location = query.location.trim();
        if location.is_empty() {
            return Err(HeraldError::InvalidArg("location must not be empty".into()));
        }
        let limit = query.max_results.min(self.cfg.limits.max_events);

        let provider = match self.events.as_ref() {
            Some(provider) if provider.is_operational() => provider,
            other => {
                let connector = other.map_or("events", |p| p.name());
                self.observer.observe(&CoreEvent::NotOperational {
                    connector: connector.to_string(),
                });
                let mut items =
                    dedup_by_name_and_date(self.range_cache.cached_items(location, range));
                items.truncate(limit);
                let cached = items.len();
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    connector,
                    cached,
                    "events provider not operational; serving stored listings only"
                );
                return Ok(DiscoveryReport {
                    items,
                    requested_limit: limit,
                    cached,
                    fresh: 0,
                    warnings: vec![HeraldError::not_operational(connector)],
                });
            }
        };
        if limit == 0 {
            return Ok(DiscoveryReport::empty(limit));
        }

        let category = query.effective_category();
        let fetch = self
            .range_cache
            .fetch(location, range, limit, |request| {
                let provider = Arc::clone(provider);
                async move {
                    let fetch = EventFetch {
                        location: request.group,
                        start: request.range.start(),
                        end: request.range.end(),
                        category,
                        count: request.needed,
                    };
                    provider.fetch_events(&fetch).await
                }
            })
            .await;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            cached = fetch.cached,
            fresh = fetch.fresh,
            failed = fetch.error.is_some(),
            "event discovery finished"
        );
        Ok(DiscoveryReport {
            items: fetch.items,
            requested_limit: limit,
            cached: fetch.cached,
            fresh: fetch.fresh,
            warnings: fetch.error.into_iter().collect(),
        })
    }
}
