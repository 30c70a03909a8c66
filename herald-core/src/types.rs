//! Domain types shared by connectors, middleware and engines.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use herald_types::{
    CacheConfig, CacheQuotaOrdering, DiscoveryLimits, DiscoveryReport, EndpointQuota,
    GroupCacheStats, HeraldConfig, HeraldError, HeraldStatus, JitterRange, QuotaConfig,
    QuotaState, RangeCacheConfig, RangeCacheStats, RateLimitInfo, RetryConfig,
};

/// A payload returned by one upstream invocation, with the rate-limit
/// metadata reported alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse<T> {
    /// Decoded response body.
    pub payload: T,
    /// Rate-limit metadata; empty when the upstream reported none.
    pub rate_limit: RateLimitInfo,
}

impl<T> UpstreamResponse<T> {
    /// Wrap a payload without rate-limit metadata.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            rate_limit: RateLimitInfo::default(),
        }
    }

    /// Attach rate-limit metadata.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitInfo) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// An item that belongs to a date and can be deduplicated by name.
pub trait RangeItem {
    /// Date the item takes place on.
    fn date(&self) -> NaiveDate;
    /// Display name used for deduplication (compared trimmed and lower-cased).
    fn identity_name(&self) -> &str;
}

/// A recent-post search request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Provider query string.
    pub query: String,
    /// Number of posts requested.
    pub max_results: u32,
}

impl SearchQuery {
    /// Convenience constructor.
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results,
        }
    }

    /// Stable response-cache key for this request.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("search:{}:{}", self.max_results, self.query)
    }
}

/// A single social post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Provider post id.
    pub id: String,
    /// Post text.
    pub text: String,
    /// Id of the posting user.
    pub author_id: String,
    /// Creation time, if reported.
    pub created_at: Option<DateTime<Utc>>,
}

/// A social user profile as expanded in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider user id.
    pub id: String,
    /// Handle without the leading `@`.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Profile description.
    pub bio: String,
    /// Free-form profile location.
    pub location: String,
    /// Follower count.
    pub followers_count: u64,
    /// Whether the account is verified.
    pub verified: bool,
}

/// One page of recent-post search results with expanded authors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSearchPage {
    /// Matching posts.
    pub posts: Vec<Post>,
    /// Authors referenced by `posts`.
    pub users: Vec<User>,
}

impl PostSearchPage {
    /// Look up the author of a post.
    #[must_use]
    pub fn author_of(&self, post: &Post) -> Option<&User> {
        self.users.iter().find(|u| u.id == post.author_id)
    }

    /// True when the page holds no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// A person discovered as likely attending an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    /// Display name.
    pub name: String,
    /// Handle including the leading `@`.
    pub username: String,
    /// Profile description.
    pub bio: String,
    /// Profile location.
    pub location: String,
    /// Follower count.
    pub followers_count: u64,
    /// Whether the account is verified.
    pub verified: bool,
    /// Confidence score in `[0, 0.95]`.
    pub confidence: f64,
    /// Link to the post the attendee was found in.
    pub source_url: String,
    /// Who posted the source.
    pub posted_by: String,
}

/// Coarse event category derived from the event title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum EventCategory {
    /// Concerts, DJ sets, live music.
    Music,
    /// Conferences, summits, workshops.
    Conference,
    /// Festivals and celebrations.
    Festival,
    /// Games, matches, races.
    Sports,
    /// Theater, exhibitions, galleries.
    Arts,
    /// Food and drink.
    Food,
    /// Family and kids.
    Family,
    /// Stand-up and improv.
    Comedy,
    /// Anything else.
    #[default]
    Other,
}

impl EventCategory {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Conference => "conference",
            Self::Festival => "festival",
            Self::Sports => "sports",
            Self::Arts => "arts",
            Self::Food => "food",
            Self::Family => "family",
            Self::Comedy => "comedy",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "music" => Ok(Self::Music),
            "conference" => Ok(Self::Conference),
            "festival" => Ok(Self::Festival),
            "sports" => Ok(Self::Sports),
            "arts" => Ok(Self::Arts),
            "food" => Ok(Self::Food),
            "family" => Ok(Self::Family),
            "comedy" => Ok(Self::Comedy),
            "other" => Ok(Self::Other),
            other => Err(HeraldError::InvalidArg(format!(
                "unknown event category: {other}"
            ))),
        }
    }
}

/// Category selection for an event search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// No restriction.
    #[default]
    All,
    /// A single category.
    Only(EventCategory),
}

impl CategoryFilter {
    /// Whether searches under this filter should include queries for `category`.
    #[must_use]
    pub fn includes(self, category: EventCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => c == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// A dated event listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListing {
    /// Event title.
    pub name: String,
    /// Date the event takes place (start date for multi-day events).
    pub date: NaiveDate,
    /// Venue or address.
    pub venue: String,
    /// Location the event was searched for.
    pub location: String,
    /// Derived category.
    pub category: EventCategory,
    /// Source link.
    pub link: String,
    /// Listing description.
    pub description: String,
    /// Confidence score.
    pub confidence: f64,
    /// Source label.
    pub posted_by: String,
}

impl RangeItem for EventListing {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn identity_name(&self) -> &str {
        &self.name
    }
}
