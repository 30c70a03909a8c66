//! Herald discovers event attendees and event listings from third-party search
//! APIs while spending as little upstream quota as possible.
//!
//! Overview
//! - Attendee discovery searches recent social posts through a
//!   [`GuardedCaller`]: every call checks the endpoint's quota, consults a
//!   short-TTL response cache, retries a transient failure once with bounded
//!   backoff and refreshes the quota from response metadata.
//! - Event discovery goes through a [`RangeCache`]: listings fetched for a date
//!   range are kept per location, and a later request only fetches the
//!   shortfall its overlapping stored ranges cannot serve.
//! - Upstream failures never fail a discovery. They are downgraded to empty or
//!   partial results and listed in [`DiscoveryReport::warnings`]; `Err` is
//!   reserved for invalid arguments.
//!
//! Key behaviors and trade-offs
//! - Ordering: `QuotaFirst` (default) charges cache hits one quota unit, which
//!   keeps the local budget conservative; `CacheFirst` makes hits free.
//! - A locally exhausted quota is advisory. The caller waits a bounded time and
//!   proceeds, relying on the upstream to refuse if the budget really is gone.
//! - Request caps bound the upstream cost of a single discovery regardless of
//!   the limit a user asks for.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald::{EventQuery, Herald};
//! use herald_connectors::{SerpEventsConnector, TwitterConnector};
//!
//! let herald = Herald::builder()
//!     .social(Arc::new(TwitterConnector::from_env()?))
//!     .events(Arc::new(SerpEventsConnector::from_env()?))
//!     .build()?;
//!
//! let attendees = herald.discover_attendees("RustConf 2024", 10).await?;
//! for warning in &attendees.warnings {
//!     eprintln!("partial result: {warning}");
//! }
//!
//! let query = EventQuery::new("Austin", start, end).max_results(5);
//! let events = herald.discover_events(&query).await?;
//! println!("{} cached, {} fresh", events.cached, events.fresh);
//! ```
//!
//! See `herald/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod discovery;

pub use core::{Herald, HeraldBuilder};
pub use discovery::events::EventQuery;

pub use herald_middleware::{
    DateRange, GuardedCaller, QuotaTracker, RangeCache, ResponseCache, Served,
};

// Re-export core types for convenience
pub use herald_core::{
    Attendee,
    CacheConfig,
    CacheQuotaOrdering,
    CategoryFilter,
    Clock,
    CoreEvent,
    DiscoveryLimits,
    DiscoveryReport,
    EndpointQuota,
    EventCategory,
    EventFetch,
    EventListing,
    EventListingProvider,
    GroupCacheStats,
    HeraldConfig,
    HeraldError,
    HeraldStatus,
    JitterRange,
    NoopObserver,
    Observer,
    Post,
    PostSearchPage,
    QuotaConfig,
    QuotaState,
    RangeCacheConfig,
    RangeCacheStats,
    RateLimitInfo,
    RetryConfig,
    SearchQuery,
    SocialSearchProvider,
    SystemClock,
    TracingObserver,
    UpstreamResponse,
    User,
};
