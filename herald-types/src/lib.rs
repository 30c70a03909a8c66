//! Herald-specific error, configuration and report types shared by every crate
//! in the workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod quota;
mod reports;

pub use config::{
    CacheConfig, CacheQuotaOrdering, DiscoveryLimits, EndpointQuota, HeraldConfig, JitterRange,
    QuotaConfig, RangeCacheConfig, RetryConfig,
};
pub use error::HeraldError;
pub use quota::{QuotaState, RateLimitInfo};
pub use reports::{DiscoveryReport, GroupCacheStats, HeraldStatus, RangeCacheStats};
