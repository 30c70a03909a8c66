//! Builder for composing a [`GuardedCaller`].
//!
//! Every part has a default: the system clock, the default quota budgets, a
//! 30-minute response cache, the default retry policy, quota-first ordering and
//! no diagnostics. Several callers can share one [`QuotaTracker`] so that every
//! call path for an endpoint draws from the same budget.

use std::marker::PhantomData;
use std::sync::Arc;

use herald_core::{
    CacheConfig, CacheQuotaOrdering, Clock, NoopObserver, Observer, QuotaConfig, RetryConfig,
    SystemClock,
};

use crate::cache::ResponseCache;
use crate::guard::GuardedCaller;
use crate::quota::QuotaTracker;

/// Composes quota tracking, caching, retry policy and diagnostics into a caller.
pub struct GuardedCallerBuilder<V> {
    clock: Arc<dyn Clock>,
    quota: QuotaSource,
    cache: CacheConfig,
    retry: RetryConfig,
    ordering: CacheQuotaOrdering,
    observer: Arc<dyn Observer>,
    _payload: PhantomData<fn() -> V>,
}

enum QuotaSource {
    Config(QuotaConfig),
    Shared(Arc<QuotaTracker>),
}

impl<V: Clone + Send + Sync + 'static> Default for GuardedCallerBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync + 'static> GuardedCallerBuilder<V> {
    /// Builder with every part at its default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            quota: QuotaSource::Config(QuotaConfig::default()),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            ordering: CacheQuotaOrdering::default(),
            observer: Arc::new(NoopObserver),
            _payload: PhantomData,
        }
    }

    /// Time source for quota windows and cache expiry.
    ///
    /// Ignored for the quota side when a shared tracker is supplied; that
    /// tracker keeps its own clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build a private tracker from `cfg`, replacing any shared tracker.
    #[must_use]
    pub fn quota(mut self, cfg: QuotaConfig) -> Self {
        self.quota = QuotaSource::Config(cfg);
        self
    }

    /// Draw budget from an existing tracker, replacing any quota config.
    #[must_use]
    pub fn with_shared_quota(mut self, tracker: Arc<QuotaTracker>) -> Self {
        self.quota = QuotaSource::Shared(tracker);
        self
    }

    /// Response cache settings.
    #[must_use]
    pub const fn cache(mut self, cfg: CacheConfig) -> Self {
        self.cache = cfg;
        self
    }

    /// Retry and wait policy.
    #[must_use]
    pub const fn retry(mut self, cfg: RetryConfig) -> Self {
        self.retry = cfg;
        self
    }

    /// Quota/cache ordering.
    #[must_use]
    pub const fn ordering(mut self, ordering: CacheQuotaOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Diagnostics sink.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Assemble the caller.
    #[must_use]
    pub fn build(self) -> GuardedCaller<V> {
        let quota = match self.quota {
            QuotaSource::Shared(tracker) => tracker,
            QuotaSource::Config(cfg) => Arc::new(QuotaTracker::new(&cfg, Arc::clone(&self.clock))),
        };
        GuardedCaller {
            quota,
            cache: ResponseCache::new(self.cache, self.clock),
            retry: self.retry,
            ordering: self.ordering,
            observer: self.observer,
        }
    }
}
