use std::time::Duration;

use chrono::NaiveDate;

use herald_types::HeraldError;

/// Diagnostic event emitted by the middleware and engines.
///
/// These are the only way the distinction between "no results" and "upstream
/// failed" becomes visible, since neither surfaces as an error.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CoreEvent {
    /// The local quota denied a call; the caller waits `wait` and proceeds anyway.
    QuotaDenied {
        /// Endpoint that was denied.
        endpoint: String,
        /// Best-effort wait about to be slept.
        wait: Duration,
    },
    /// A cached response was served.
    CacheHit {
        /// Endpoint the response belongs to.
        endpoint: String,
        /// Cache key.
        key: String,
    },
    /// An upstream invocation is about to start.
    UpstreamAttempt {
        /// Endpoint being called.
        endpoint: String,
        /// Zero-based attempt number.
        attempt: u32,
    },
    /// An upstream invocation failed.
    UpstreamFailed {
        /// Endpoint that failed.
        endpoint: String,
        /// Zero-based attempt number.
        attempt: u32,
        /// Classified failure.
        error: HeraldError,
        /// Whether a retry follows.
        will_retry: bool,
    },
    /// Sleeping before a retry.
    Backoff {
        /// Endpoint being retried.
        endpoint: String,
        /// Delay about to be slept.
        delay: Duration,
    },
    /// A range cache lookup finished.
    RangeLookup {
        /// Group key.
        group: String,
        /// Items served from overlapping stored ranges.
        cached: usize,
        /// Items that must be fetched fresh.
        needed: usize,
    },
    /// Fresh items were stored under a range.
    RangeStored {
        /// Group key.
        group: String,
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
        /// Number of items stored.
        items: usize,
    },
    /// The oldest range of a group was evicted.
    RangeEvicted {
        /// Group key.
        group: String,
        /// Evicted range start.
        start: NaiveDate,
        /// Evicted range end.
        end: NaiveDate,
    },
    /// A fresh fetch failed and was treated as zero new items.
    FreshFetchFailed {
        /// Group key.
        group: String,
        /// The swallowed failure.
        error: HeraldError,
    },
    /// A discovery was short-circuited because the upstream is not operational.
    NotOperational {
        /// Connector name.
        connector: String,
    },
}

/// Sink for [`CoreEvent`]s.
pub trait Observer: Send + Sync {
    /// Receive an event. Must not block.
    fn observe(&self, event: &CoreEvent);
}

/// Observer that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&self, _event: &CoreEvent) {}
}

/// Observer that forwards events to `tracing` when the `tracing` feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    #[cfg(feature = "tracing")]
    fn observe(&self, event: &CoreEvent) {
        match event {
            CoreEvent::QuotaDenied { endpoint, wait } => tracing::warn!(
                endpoint = %endpoint,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "quota exhausted; waiting before best-effort attempt"
            ),
            CoreEvent::CacheHit { endpoint, key } => {
                tracing::debug!(endpoint = %endpoint, key = %key, "serving cached response");
            }
            CoreEvent::UpstreamAttempt { endpoint, attempt } => {
                tracing::debug!(endpoint = %endpoint, attempt, "calling upstream");
            }
            CoreEvent::UpstreamFailed {
                endpoint,
                attempt,
                error,
                will_retry,
            } => tracing::warn!(
                endpoint = %endpoint,
                attempt,
                will_retry,
                error = %error,
                "upstream call failed"
            ),
            CoreEvent::Backoff { endpoint, delay } => tracing::info!(
                endpoint = %endpoint,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "backing off before retry"
            ),
            CoreEvent::RangeLookup {
                group,
                cached,
                needed,
            } => tracing::debug!(group = %group, cached, needed, "range cache lookup"),
            CoreEvent::RangeStored {
                group,
                start,
                end,
                items,
            } => tracing::debug!(group = %group, %start, %end, items, "cached range"),
            CoreEvent::RangeEvicted { group, start, end } => {
                tracing::debug!(group = %group, %start, %end, "evicted oldest range");
            }
            CoreEvent::FreshFetchFailed { group, error } => {
                tracing::warn!(group = %group, error = %error, "fresh fetch failed; serving cached items only");
            }
            CoreEvent::NotOperational { connector } => {
                tracing::warn!(connector = %connector, "upstream client not operational");
            }
        }
    }

    #[cfg(not(feature = "tracing"))]
    fn observe(&self, _event: &CoreEvent) {}
}
