use std::sync::Arc;

use herald_core::{
    CacheQuotaOrdering, Clock, EventListing, EventListingProvider, HeraldConfig, HeraldError,
    HeraldStatus, Observer, PostSearchPage, QuotaConfig, SocialSearchProvider, SystemClock,
    TracingObserver,
};
use herald_middleware::{GuardedCaller, RangeCache};

/// Orchestrator that runs attendee and event discovery against the registered providers.
pub struct Herald {
    pub(crate) social: Option<Arc<dyn SocialSearchProvider>>,
    pub(crate) events: Option<Arc<dyn EventListingProvider>>,
    pub(crate) social_caller: GuardedCaller<PostSearchPage>,
    pub(crate) range_cache: RangeCache<EventListing>,
    pub(crate) observer: Arc<dyn Observer>,
    pub(crate) cfg: HeraldConfig,
}

/// Builder for constructing a `Herald` orchestrator with custom configuration.
pub struct HeraldBuilder {
    social: Option<Arc<dyn SocialSearchProvider>>,
    events: Option<Arc<dyn EventListingProvider>>,
    cfg: HeraldConfig,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
}

impl Default for HeraldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeraldBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no providers; register at least one via [`social`](Self::social)
    ///   or [`events`](Self::events).
    /// - Defaults follow the upstream's published budgets: `search_recent` 450 and
    ///   `users` 300 calls per 15 minutes, a 30-minute response cache, one retry
    ///   with backoff capped at 10s, and quota-first ordering.
    /// - Diagnostics go to [`TracingObserver`], which is silent unless the
    ///   `tracing` feature is enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            social: None,
            events: None,
            cfg: HeraldConfig::default(),
            clock: Arc::new(SystemClock),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Register the social search provider used for attendee discovery.
    ///
    /// A provider that reports itself as not operational is kept; discoveries
    /// short-circuit to empty results without touching quota.
    #[must_use]
    pub fn social(mut self, provider: Arc<dyn SocialSearchProvider>) -> Self {
        self.social = Some(provider);
        self
    }

    /// Register the event-listing provider used for event discovery.
    #[must_use]
    pub fn events(mut self, provider: Arc<dyn EventListingProvider>) -> Self {
        self.events = Some(provider);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: HeraldConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Per-endpoint quota budgets.
    #[must_use]
    pub fn quota(mut self, cfg: QuotaConfig) -> Self {
        self.cfg.quota = cfg;
        self
    }

    /// Quota/cache ordering of the guarded caller.
    ///
    /// Behavior and trade-offs:
    /// - `QuotaFirst`: every call, cache hits included, consumes one unit; the
    ///   local budget never underestimates upstream usage.
    /// - `CacheFirst`: hits are free, so repeated identical requests never wait
    ///   on an exhausted budget.
    #[must_use]
    pub const fn ordering(mut self, ordering: CacheQuotaOrdering) -> Self {
        self.cfg.ordering = ordering;
        self
    }

    /// Time source for quota windows and cache expiry.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Diagnostics sink for quota, cache, retry and range-cache events.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Build the `Herald` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the configuration does not validate or no
    /// provider has been registered.
    pub fn build(self) -> Result<Herald, HeraldError> {
        self.cfg.validate()?;
        if self.social.is_none() && self.events.is_none() {
            return Err(HeraldError::InvalidArg(
                "no providers registered; add one via social(...) or events(...)".to_string(),
            ));
        }

        let social_caller = GuardedCaller::builder()
            .clock(Arc::clone(&self.clock))
            .quota(self.cfg.quota.clone())
            .cache(self.cfg.cache)
            .retry(self.cfg.retry)
            .ordering(self.cfg.ordering)
            .observer(Arc::clone(&self.observer))
            .build();
        let range_cache =
            RangeCache::new(self.cfg.range_cache).with_observer(Arc::clone(&self.observer));

        Ok(Herald {
            social: self.social,
            events: self.events,
            social_caller,
            range_cache,
            observer: self.observer,
            cfg: self.cfg,
        })
    }
}

impl Herald {
    /// Start building a new `Herald` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use herald_mock::{MockEventSource, MockSocialProvider};
    ///
    /// let herald = herald::Herald::builder()
    ///     .social(Arc::new(MockSocialProvider::new()))
    ///     .events(Arc::new(MockEventSource::default()))
    ///     .ordering(herald::CacheQuotaOrdering::CacheFirst)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> HeraldBuilder {
        HeraldBuilder::new()
    }

    /// Effective configuration.
    pub const fn config(&self) -> &HeraldConfig {
        &self.cfg
    }

    /// Guarded caller used for the social search endpoint.
    pub const fn social_caller(&self) -> &GuardedCaller<PostSearchPage> {
        &self.social_caller
    }

    /// Range cache holding event listings per location.
    pub const fn range_cache(&self) -> &RangeCache<EventListing> {
        &self.range_cache
    }

    /// Diagnostic snapshot. Never calls an upstream.
    pub fn status(&self) -> HeraldStatus {
        HeraldStatus {
            social_operational: self
                .social
                .as_ref()
                .is_some_and(|provider| provider.is_operational()),
            quotas: self.social_caller.quota().status(),
            response_cache_entries: self.social_caller.cache().len(),
            range_cache: self.range_cache.stats(),
        }
    }

    /// Physically remove expired response-cache entries; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.social_caller.cache().sweep_expired();
        #[cfg(feature = "tracing")]
        tracing::debug!(removed, "swept expired response cache entries");
        removed
    }
}

impl std::fmt::Debug for Herald {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Herald")
            .field("social", &self.social.as_ref().map(|p| p.name()))
            .field("events", &self.events.as_ref().map(|p| p.name()))
            .field("social_caller", &self.social_caller)
            .field("range_cache", &self.range_cache)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}
