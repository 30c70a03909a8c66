use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryFilter, EventListing, PostSearchPage, SearchQuery, UpstreamResponse};
use herald_types::HeraldError;

/// Focused role trait for connectors that search recent social posts.
///
/// Each `search_recent` call performs exactly one upstream invocation; quota,
/// caching and retries are applied around it by the guarded caller.
#[async_trait]
pub trait SocialSearchProvider: Send + Sync {
    /// Human-readable connector name for logging.
    fn name(&self) -> &'static str;

    /// Whether the client finished its setup and may be called.
    ///
    /// Callers check this before touching quota or the network.
    fn is_operational(&self) -> bool {
        true
    }

    /// Search recent posts.
    ///
    /// Failure signals: `HeraldError::TooManyRequests` when throttled,
    /// `HeraldError::BadRequest` for malformed queries, anything else is
    /// treated as a transient failure.
    async fn search_recent(
        &self,
        query: &SearchQuery,
    ) -> Result<UpstreamResponse<PostSearchPage>, HeraldError>;
}

/// Parameters of a fresh event-listing fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFetch {
    /// Location to search in.
    pub location: String,
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
    /// Category selection.
    pub category: CategoryFilter,
    /// Number of listings wanted.
    pub count: usize,
}

/// Focused role trait for connectors that list events.
#[async_trait]
pub trait EventListingProvider: Send + Sync {
    /// Human-readable connector name for logging.
    fn name(&self) -> &'static str;

    /// Whether the provider can serve requests (credentials present, client built).
    ///
    /// Callers check this before touching the network; stored listings may
    /// still be served while it is false.
    fn is_operational(&self) -> bool {
        true
    }

    /// Fetch up to `request.count` listings dated within `[start, end]`.
    async fn fetch_events(&self, request: &EventFetch) -> Result<Vec<EventListing>, HeraldError>;
}
