//! Quota snapshots and upstream rate-limit metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an endpoint's quota budget at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaState {
    /// Maximum calls per window.
    pub limit: u64,
    /// Calls still available before the endpoint is denied.
    pub remaining: u64,
    /// When the budget refills, if a reset is scheduled.
    pub reset_at: Option<DateTime<Utc>>,
}

/// Rate-limit metadata reported by an upstream alongside a response.
///
/// Each field is independent; absent fields leave the tracked value untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Upstream's view of the window limit.
    pub limit: Option<u64>,
    /// Upstream's view of the remaining calls.
    pub remaining: Option<u64>,
    /// Reset instant as seconds since the Unix epoch.
    pub reset_epoch_secs: Option<i64>,
}

impl RateLimitInfo {
    /// True when no metadata was reported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset_epoch_secs.is_none()
    }
}
