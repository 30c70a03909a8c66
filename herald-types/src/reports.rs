//! Report envelopes produced by the orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::HeraldError;
use crate::quota::QuotaState;

/// Result of a discovery request.
///
/// Upstream failures never fail a discovery; they are downgraded to an empty
/// or partial `items` list and recorded in `warnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport<T> {
    /// Discovered items, at most `requested_limit`.
    pub items: Vec<T>,
    /// Result limit after request caps were applied.
    pub requested_limit: usize,
    /// Items served from a cache.
    pub cached: usize,
    /// Items obtained from upstream for this request.
    pub fresh: usize,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<HeraldError>,
}

impl<T> DiscoveryReport<T> {
    /// An empty report for the given (capped) limit.
    #[must_use]
    pub const fn empty(requested_limit: usize) -> Self {
        Self {
            items: Vec::new(),
            requested_limit,
            cached: 0,
            fresh: 0,
            warnings: Vec::new(),
        }
    }

    /// Attach a warning.
    #[must_use]
    pub fn with_warning(mut self, warning: HeraldError) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Number of items in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Range cache usage for a single group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCacheStats {
    /// Number of stored ranges.
    pub cached_ranges: usize,
    /// Number of items across all stored ranges.
    pub total_items: usize,
}

/// Range cache usage across groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCacheStats {
    /// Per-group statistics keyed by group (e.g. location).
    pub groups: BTreeMap<String, GroupCacheStats>,
}

impl RangeCacheStats {
    /// Number of groups with at least one stored range.
    #[must_use]
    pub fn total_groups(&self) -> usize {
        self.groups.len()
    }
}

/// Diagnostic status of the orchestrator.
///
/// Producing it never performs an upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeraldStatus {
    /// Whether the social search client is configured and operational.
    pub social_operational: bool,
    /// Quota snapshot per tracked endpoint.
    pub quotas: BTreeMap<String, QuotaState>,
    /// Entries currently held by the response cache (including expired, unswept ones).
    pub response_cache_entries: usize,
    /// Range cache usage.
    pub range_cache: RangeCacheStats,
}
