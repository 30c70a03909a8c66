//! Configuration types shared by the middleware and the orchestrator.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HeraldError;

/// Order in which the guarded caller consults the quota tracker and the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CacheQuotaOrdering {
    /// Consume a quota unit first, then look in the cache.
    ///
    /// Cache hits still cost one unit of budget.
    #[default]
    QuotaFirst,
    /// Look in the cache first; only cache misses consume quota.
    CacheFirst,
}

/// Budget for a single upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointQuota {
    /// Maximum number of calls within one window.
    pub limit: u64,
    /// Length of the window that starts once the budget is exhausted.
    pub window: Duration,
}

impl EndpointQuota {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(limit: u64, window: Duration) -> Self {
        Self { limit, window }
    }
}

/// Per-endpoint quota configuration.
///
/// Endpoints that are not listed here are never restricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Budgets keyed by endpoint name (e.g. "`search_recent`", "users").
    pub endpoints: BTreeMap<String, EndpointQuota>,
    /// Wait hint returned while an endpoint has no scheduled reset.
    pub default_wait: Duration,
}

impl QuotaConfig {
    /// Endpoint name of the recent-post search API.
    pub const SEARCH_RECENT: &'static str = "search_recent";
    /// Endpoint name of the user lookup API.
    pub const USERS: &'static str = "users";

    /// Quota configuration with no tracked endpoints.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            endpoints: BTreeMap::new(),
            default_wait: Duration::from_secs(60),
        }
    }

    /// Add or replace the budget for `endpoint`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>, quota: EndpointQuota) -> Self {
        self.endpoints.insert(endpoint.into(), quota);
        self
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        let window = Duration::from_secs(15 * 60);
        Self::unrestricted()
            .with_endpoint(Self::SEARCH_RECENT, EndpointQuota::new(450, window))
            .with_endpoint(Self::USERS, EndpointQuota::new(300, window))
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live of a cached response. Zero disables caching.
    pub ttl: Duration,
    /// Upper bound on held responses; the least recently used entry is evicted first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            max_entries: 1_024,
        }
    }
}

/// Inclusive bounds for a random delay added on top of a computed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    /// Lower bound.
    pub min: Duration,
    /// Upper bound.
    pub max: Duration,
}

impl JitterRange {
    /// Construct a jitter range from millisecond bounds.
    #[must_use]
    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        }
    }

    /// A range that always yields zero jitter.
    #[must_use]
    pub const fn none() -> Self {
        Self::from_millis(0, 0)
    }
}

/// Retry and wait policy of the guarded caller.
///
/// A call makes at most two upstream attempts regardless of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay for exponential backoff (`base * 2^attempt`).
    pub base_delay: Duration,
    /// Upper bound of the exponential part of a retry backoff.
    pub max_backoff: Duration,
    /// Jitter added to each retry backoff.
    pub backoff_jitter: JitterRange,
    /// Upper bound of the best-effort wait when the local quota is exhausted.
    pub max_quota_wait: Duration,
    /// Jitter added to each quota wait.
    pub quota_jitter: JitterRange,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
            backoff_jitter: JitterRange::from_millis(100, 1_000),
            max_quota_wait: Duration::from_secs(15),
            quota_jitter: JitterRange::from_millis(100, 500),
        }
    }
}

/// Partial-hit range cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeCacheConfig {
    /// Number of most recent ranges kept per group.
    pub max_ranges_per_group: usize,
}

impl Default for RangeCacheConfig {
    fn default() -> Self {
        Self {
            max_ranges_per_group: 5,
        }
    }
}

/// Caps applied to user-supplied result limits before any upstream work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryLimits {
    /// Maximum number of events returned by one discovery request.
    pub max_events: usize,
    /// Maximum number of attendees returned by one discovery request.
    pub max_attendees: usize,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            max_events: 20,
            max_attendees: 30,
        }
    }
}

/// Global configuration for the `Herald` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    /// Per-endpoint quota budgets.
    pub quota: QuotaConfig,
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Retry and wait policy.
    pub retry: RetryConfig,
    /// Quota/cache ordering policy of the guarded caller.
    pub ordering: CacheQuotaOrdering,
    /// Range cache settings for the event-listing source.
    pub range_cache: RangeCacheConfig,
    /// Request caps.
    pub limits: DiscoveryLimits,
}

impl HeraldConfig {
    /// Check the configuration for values that would make the core unusable.
    ///
    /// # Errors
    /// Returns `HeraldError::InvalidArg` when the range cache keeps no ranges,
    /// the response cache holds no entries, a request cap is zero, or a jitter
    /// range is inverted.
    pub fn validate(&self) -> Result<(), HeraldError> {
        if self.range_cache.max_ranges_per_group == 0 {
            return Err(HeraldError::InvalidArg(
                "range_cache.max_ranges_per_group must be at least 1".into(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(HeraldError::InvalidArg(
                "cache.max_entries must be at least 1".into(),
            ));
        }
        if self.limits.max_events == 0 || self.limits.max_attendees == 0 {
            return Err(HeraldError::InvalidArg(
                "discovery limits must be at least 1".into(),
            ));
        }
        for (name, jitter) in [
            ("retry.backoff_jitter", self.retry.backoff_jitter),
            ("retry.quota_jitter", self.retry.quota_jitter),
        ] {
            if jitter.min > jitter.max {
                return Err(HeraldError::InvalidArg(format!(
                    "{name}: min must not exceed max"
                )));
            }
        }
        Ok(())
    }
}
