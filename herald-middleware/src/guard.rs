//! Guarded upstream invocation.
//!
//! A call runs through the same sequence on each attempt:
//!
//! ```text
//! quota check (best-effort wait on denial)
//!     ↓
//! cache lookup (hit returns immediately)
//!     ↓
//! upstream invocation
//!     ↓
//! success: refresh quota from metadata, cache payload
//! failure: refresh quota from any throttling metadata; non-retryable
//!          returns, otherwise back off and try once more
//! ```
//!
//! Under [`CacheQuotaOrdering::CacheFirst`] the cache lookup moves ahead of the
//! quota check so hits never consume budget.

use std::future::Future;
use std::sync::Arc;

use herald_core::{
    CacheQuotaOrdering, CoreEvent, HeraldError, Observer, RetryConfig, UpstreamResponse,
};

use crate::backoff::{backoff_delay, quota_wait};
use crate::builder::GuardedCallerBuilder;
use crate::cache::ResponseCache;
use crate::quota::QuotaTracker;

/// Upper bound on upstream invocations per [`GuardedCaller::call`].
pub const MAX_ATTEMPTS: u32 = 2;

/// A value returned by [`GuardedCaller::call_served`], tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served<V> {
    /// The payload.
    pub value: V,
    /// True when the response cache answered and no upstream call was made.
    pub from_cache: bool,
}

/// Wraps single upstream invocations with quota, caching and bounded retry.
pub struct GuardedCaller<V> {
    pub(crate) quota: Arc<QuotaTracker>,
    pub(crate) cache: ResponseCache<V>,
    pub(crate) retry: RetryConfig,
    pub(crate) ordering: CacheQuotaOrdering,
    pub(crate) observer: Arc<dyn Observer>,
}

impl<V: Clone + Send + Sync + 'static> GuardedCaller<V> {
    /// Start composing a caller.
    #[must_use]
    pub fn builder() -> GuardedCallerBuilder<V> {
        GuardedCallerBuilder::new()
    }

    /// Shared quota tracker.
    pub const fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    /// Response cache.
    pub const fn cache(&self) -> &ResponseCache<V> {
        &self.cache
    }

    /// Active quota/cache ordering.
    pub const fn ordering(&self) -> CacheQuotaOrdering {
        self.ordering
    }

    /// Invoke `invoke` against `endpoint`, at most [`MAX_ATTEMPTS`] times.
    ///
    /// When `cache_key` is given, a live cached value short-circuits the call
    /// and a successful payload is cached under it.
    ///
    /// # Errors
    /// Returns the last upstream failure when every attempt failed, or the
    /// first non-retryable failure immediately.
    pub async fn call<F, Fut>(
        &self,
        endpoint: &str,
        cache_key: Option<&str>,
        invoke: F,
    ) -> Result<V, HeraldError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<UpstreamResponse<V>, HeraldError>>,
    {
        self.call_served(endpoint, cache_key, invoke)
            .await
            .map(|served| served.value)
    }

    /// Like [`call`](Self::call), also reporting whether the cache answered.
    ///
    /// # Errors
    /// Same as [`call`](Self::call).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "herald::middleware::guarded_call",
            skip_all,
            fields(endpoint = %endpoint, cached = cache_key.is_some()),
        )
    )]
    pub async fn call_served<F, Fut>(
        &self,
        endpoint: &str,
        cache_key: Option<&str>,
        mut invoke: F,
    ) -> Result<Served<V>, HeraldError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<UpstreamResponse<V>, HeraldError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            if self.ordering == CacheQuotaOrdering::CacheFirst
                && let Some(hit) = self.cached(endpoint, cache_key)
            {
                return Ok(hit);
            }

            self.await_quota(endpoint).await;

            if self.ordering == CacheQuotaOrdering::QuotaFirst
                && let Some(hit) = self.cached(endpoint, cache_key)
            {
                return Ok(hit);
            }

            self.observer.observe(&CoreEvent::UpstreamAttempt {
                endpoint: endpoint.to_string(),
                attempt,
            });

            match invoke().await {
                Ok(response) => {
                    self.quota
                        .update_from_upstream(endpoint, &response.rate_limit);
                    if let Some(key) = cache_key {
                        self.cache.set(key, response.payload.clone());
                    }
                    return Ok(Served {
                        value: response.payload,
                        from_cache: false,
                    });
                }
                Err(error) => {
                    if let Some(info) = error.rate_limit() {
                        self.quota.update_from_upstream(endpoint, info);
                    }
                    let will_retry = error.is_retryable() && attempt + 1 < MAX_ATTEMPTS;
                    self.observer.observe(&CoreEvent::UpstreamFailed {
                        endpoint: endpoint.to_string(),
                        attempt,
                        error: error.clone(),
                        will_retry,
                    });
                    if !will_retry {
                        return Err(error);
                    }
                    let delay = backoff_delay(&self.retry, attempt);
                    self.observer.observe(&CoreEvent::Backoff {
                        endpoint: endpoint.to_string(),
                        delay,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn cached(&self, endpoint: &str, cache_key: Option<&str>) -> Option<Served<V>> {
        let key = cache_key?;
        let value = self.cache.get(key)?;
        self.observer.observe(&CoreEvent::CacheHit {
            endpoint: endpoint.to_string(),
            key: key.to_string(),
        });
        Some(Served {
            value,
            from_cache: true,
        })
    }

    async fn await_quota(&self, endpoint: &str) {
        if self.quota.check_and_consume(endpoint) {
            return;
        }
        let wait = quota_wait(&self.retry, self.quota.wait_hint(endpoint));
        self.observer.observe(&CoreEvent::QuotaDenied {
            endpoint: endpoint.to_string(),
            wait,
        });
        tokio::time::sleep(wait).await;
    }

    /// Effective configuration, for diagnostics.
    pub fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ordering": self.ordering,
            "cache_ttl_ms": u64::try_from(self.cache.ttl().as_millis()).unwrap_or(u64::MAX),
            "cache_max_entries": self.cache.capacity(),
            "max_attempts": MAX_ATTEMPTS,
            "retry": self.retry,
            "endpoints": self.quota.status().keys().cloned().collect::<Vec<_>>(),
        })
    }
}

impl<V> std::fmt::Debug for GuardedCaller<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedCaller")
            .field("quota", &self.quota)
            .field("cache", &self.cache)
            .field("retry", &self.retry)
            .field("ordering", &self.ordering)
            .finish_non_exhaustive()
    }
}
