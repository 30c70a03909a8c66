//! Wait computations for the guarded caller.

use std::time::Duration;

use herald_core::{JitterRange, RetryConfig};
use rand::Rng;

/// A uniformly random duration within `range` (millisecond resolution).
///
/// An empty or inverted range yields its lower bound.
#[must_use]
pub fn jitter(range: JitterRange) -> Duration {
    let min = u64::try_from(range.min.as_millis()).unwrap_or(u64::MAX);
    let max = u64::try_from(range.max.as_millis()).unwrap_or(u64::MAX);
    if max <= min {
        return range.min;
    }
    let mut rng = rand::rng();
    Duration::from_millis(rng.random_range(min..=max))
}

/// Delay before retry number `attempt + 1`: `min(base * 2^attempt, max_backoff)` plus jitter.
#[must_use]
pub fn backoff_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
    let exp = cfg
        .base_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(cfg.max_backoff);
    exp + jitter(cfg.backoff_jitter)
}

/// Best-effort wait after a local quota denial: the hint capped at
/// `max_quota_wait`, plus jitter.
#[must_use]
pub fn quota_wait(cfg: &RetryConfig, hint: Duration) -> Duration {
    hint.min(cfg.max_quota_wait) + jitter(cfg.quota_jitter)
}
