//! Per-endpoint quota tracking.
//!
//! Endpoints without a configured budget are never restricted, so optional
//! integrations keep working when nobody configured a quota for them.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use herald_core::clock::{add_duration, elapsed_between};
use herald_core::{Clock, HeraldError, QuotaConfig, QuotaState, RateLimitInfo};

/// Tracks the remaining call budget of each upstream endpoint.
///
/// A single mutex guards every endpoint; critical sections are short and
/// never span an `.await`.
pub struct QuotaTracker {
    clock: Arc<dyn Clock>,
    default_wait: Duration,
    runtime: Mutex<HashMap<String, EndpointRuntime>>,
}

struct EndpointRuntime {
    limit: u64,
    remaining: u64,
    reset_at: Option<DateTime<Utc>>,
    window: Duration,
}

impl EndpointRuntime {
    fn snapshot(&self) -> QuotaState {
        QuotaState {
            limit: self.limit,
            remaining: self.remaining,
            reset_at: self.reset_at,
        }
    }

    fn refill_if_due(&mut self, now: DateTime<Utc>) {
        if let Some(reset_at) = self.reset_at
            && now >= reset_at
        {
            self.remaining = self.limit;
            self.reset_at = None;
        }
    }
}

impl QuotaTracker {
    /// Create a tracker with every configured endpoint at full budget.
    pub fn new(config: &QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        let runtime = config
            .endpoints
            .iter()
            .map(|(name, quota)| {
                (
                    name.clone(),
                    EndpointRuntime {
                        limit: quota.limit,
                        remaining: quota.limit,
                        reset_at: None,
                        window: quota.window,
                    },
                )
            })
            .collect();
        Self {
            clock,
            default_wait: config.default_wait,
            runtime: Mutex::new(runtime),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, EndpointRuntime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume one unit of `endpoint`'s budget if any is left.
    ///
    /// A due reset is applied first. When the budget is exhausted and no reset
    /// is scheduled yet, one is scheduled a full window from now.
    pub fn check_and_consume(&self, endpoint: &str) -> bool {
        self.try_consume(endpoint).is_ok()
    }

    /// Like [`check_and_consume`](Self::check_and_consume), reporting the denial.
    ///
    /// # Errors
    /// Returns `HeraldError::QuotaExceeded` with the time left until the
    /// scheduled reset when the budget is exhausted.
    pub fn try_consume(&self, endpoint: &str) -> Result<(), HeraldError> {
        let now = self.clock.now();
        let mut rt = self.lock();
        let Some(ep) = rt.get_mut(endpoint) else {
            return Ok(());
        };

        ep.refill_if_due(now);

        if ep.remaining > 0 {
            ep.remaining -= 1;
            return Ok(());
        }

        let reset_at = *ep
            .reset_at
            .get_or_insert_with(|| add_duration(now, ep.window));
        let reset_in_ms = u64::try_from(elapsed_between(now, reset_at).as_millis())
            .unwrap_or(u64::MAX);
        drop(rt);
        Err(HeraldError::QuotaExceeded {
            endpoint: endpoint.to_string(),
            reset_in_ms,
        })
    }

    /// Overwrite tracked state with upstream-reported metadata.
    ///
    /// Upstream truth wins over the local estimate. `limit` is applied before
    /// `remaining`, and `remaining` is clamped to the limit. Unknown endpoints
    /// and empty metadata are ignored, as is a reset instant chrono cannot
    /// represent.
    pub fn update_from_upstream(&self, endpoint: &str, info: &RateLimitInfo) {
        if info.is_empty() {
            return;
        }
        let mut rt = self.lock();
        let Some(ep) = rt.get_mut(endpoint) else {
            return;
        };
        if let Some(limit) = info.limit {
            ep.limit = limit;
            ep.remaining = ep.remaining.min(limit);
        }
        if let Some(remaining) = info.remaining {
            ep.remaining = remaining.min(ep.limit);
        }
        if let Some(reset_at) = info
            .reset_epoch_secs
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            ep.reset_at = Some(reset_at);
        }
    }

    /// Recommended wait before the next call to `endpoint`.
    ///
    /// Time until the scheduled reset (never negative); the configured default
    /// when no reset is scheduled; zero for untracked endpoints.
    pub fn wait_hint(&self, endpoint: &str) -> Duration {
        let now = self.clock.now();
        let rt = self.lock();
        match rt.get(endpoint) {
            None => Duration::ZERO,
            Some(ep) => ep
                .reset_at
                .map_or(self.default_wait, |reset_at| elapsed_between(now, reset_at)),
        }
    }

    /// Snapshot of a single endpoint, if it is tracked.
    pub fn state(&self, endpoint: &str) -> Option<QuotaState> {
        self.lock().get(endpoint).map(EndpointRuntime::snapshot)
    }

    /// Snapshot of every tracked endpoint.
    pub fn status(&self) -> BTreeMap<String, QuotaState> {
        self.lock()
            .iter()
            .map(|(name, ep)| (name.clone(), ep.snapshot()))
            .collect()
    }

    /// Whether `endpoint` has a configured budget.
    pub fn is_tracked(&self, endpoint: &str) -> bool {
        self.lock().contains_key(endpoint)
    }
}

impl std::fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaTracker")
            .field("default_wait", &self.default_wait)
            .field("endpoints", &self.status())
            .finish_non_exhaustive()
    }
}
