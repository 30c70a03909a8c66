//! herald-middleware
//!
//! Building blocks that sit between a discovery request and a quota-constrained
//! upstream:
//!
//! - [`QuotaTracker`]: per-endpoint call budget over a rolling window.
//! - [`ResponseCache`]: short-TTL store for verbatim upstream responses.
//! - [`GuardedCaller`]: quota wait, cache lookup, bounded retry and quota
//!   refresh around a single upstream invocation.
//! - [`RangeCache`]: date-range aware cache that only fetches what overlapping
//!   stored ranges cannot serve.

pub mod backoff;
mod builder;
mod cache;
mod guard;
mod quota;
mod range_cache;

pub use crate::builder::GuardedCallerBuilder;
pub use crate::cache::ResponseCache;
pub use crate::guard::{GuardedCaller, MAX_ATTEMPTS, Served};
pub use crate::quota::QuotaTracker;
pub use crate::range_cache::{DateRange, FreshRequest, RangeCache, RangeFetch, RangeKey};
