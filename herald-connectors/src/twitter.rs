use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use herald_core::{
    HeraldError, Post, PostSearchPage, QuotaConfig, RateLimitInfo, SearchQuery,
    SocialSearchProvider, UpstreamResponse, User,
};

use crate::{DEFAULT_TIMEOUT, build_http, endpoint_url, parse_base, transport_error};

const NAME: &str = "herald-twitter";
const DEFAULT_BASE: &str = "https://api.twitter.com/";
const SEARCH_PATH: &str = "2/tweets/search/recent";
const TWEET_FIELDS: &str = "author_id,created_at,text,public_metrics";
const USER_FIELDS: &str = "username,name,verified,description,location,public_metrics";

/// Recent-post search against the Twitter v2 API.
///
/// Operational only when a bearer token is configured and the HTTP client
/// could be built; otherwise every call fails with `NotOperational`.
#[derive(Debug, Clone)]
pub struct TwitterConnector {
    http: Option<reqwest::Client>,
    base: url::Url,
    bearer_token: Option<String>,
}

/// Builder for [`TwitterConnector`].
#[derive(Debug, Clone)]
pub struct TwitterConnectorBuilder {
    base: String,
    bearer_token: Option<String>,
    timeout: Duration,
}

impl Default for TwitterConnectorBuilder {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TwitterConnectorBuilder {
    /// Bearer token sent with every request.
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into()).filter(|t| !t.trim().is_empty());
        self
    }

    /// API base URL (tests point this at a local server).
    #[must_use]
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns `HeraldError::InvalidArg` when the base URL does not parse.
    pub fn build(self) -> Result<TwitterConnector, HeraldError> {
        Ok(TwitterConnector {
            http: build_http(self.timeout),
            base: parse_base(NAME, &self.base)?,
            bearer_token: self.bearer_token,
        })
    }
}

impl TwitterConnector {
    /// Connector name used in errors and logs.
    pub const NAME: &'static str = NAME;

    /// Start configuring a connector.
    #[must_use]
    pub fn builder() -> TwitterConnectorBuilder {
        TwitterConnectorBuilder::default()
    }

    /// Connector against the public API using `TWITTER_BEARER_TOKEN`.
    ///
    /// A missing token yields a non-operational connector rather than an error.
    ///
    /// # Errors
    /// Propagates [`TwitterConnectorBuilder::build`] failures.
    pub fn from_env() -> Result<Self, HeraldError> {
        let builder = Self::builder();
        match std::env::var("TWITTER_BEARER_TOKEN") {
            Ok(token) => builder.bearer_token(token).build(),
            Err(_) => builder.build(),
        }
    }
}

fn rate_limit_from_headers(headers: &HeaderMap) -> RateLimitInfo {
    fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers.get(name)?.to_str().ok()?.trim().parse().ok()
    }
    RateLimitInfo {
        limit: header(headers, "x-rate-limit-limit"),
        remaining: header(headers, "x-rate-limit-remaining"),
        reset_epoch_secs: header(headers, "x-rate-limit-reset"),
    }
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    #[serde(default)]
    data: Vec<RawTweet>,
    #[serde(default)]
    includes: RawIncludes,
}

#[derive(Debug, Default, Deserialize)]
struct RawIncludes {
    #[serde(default)]
    users: Vec<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawTweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    public_metrics: Option<RawMetrics>,
}

#[derive(Debug, Deserialize)]
struct RawMetrics {
    #[serde(default)]
    followers_count: u64,
}

impl From<RawSearch> for PostSearchPage {
    fn from(raw: RawSearch) -> Self {
        Self {
            posts: raw
                .data
                .into_iter()
                .map(|t| Post {
                    id: t.id,
                    text: t.text,
                    author_id: t.author_id,
                    created_at: t.created_at,
                })
                .collect(),
            users: raw
                .includes
                .users
                .into_iter()
                .map(|u| User {
                    id: u.id,
                    username: u.username,
                    name: u.name,
                    bio: u.description.unwrap_or_default(),
                    location: u.location.unwrap_or_default(),
                    followers_count: u.public_metrics.map_or(0, |m| m.followers_count),
                    verified: u.verified.unwrap_or(false),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl SocialSearchProvider for TwitterConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_operational(&self) -> bool {
        self.http.is_some() && self.bearer_token.is_some()
    }

    async fn search_recent(
        &self,
        query: &SearchQuery,
    ) -> Result<UpstreamResponse<PostSearchPage>, HeraldError> {
        let (Some(http), Some(token)) = (&self.http, &self.bearer_token) else {
            return Err(HeraldError::not_operational(NAME));
        };
        let endpoint = QuotaConfig::SEARCH_RECENT;

        let mut url = endpoint_url(NAME, &self.base, SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("query", &query.query)
            .append_pair("max_results", &query.max_results.clamp(10, 100).to_string())
            .append_pair("tweet.fields", TWEET_FIELDS)
            .append_pair("user.fields", USER_FIELDS)
            .append_pair("expansions", "author_id");

        #[cfg(feature = "tracing")]
        tracing::debug!(connector = NAME, query = %query.query, "searching recent posts");

        let resp = http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error(NAME, &e))?;

        let status = resp.status();
        let rate_limit = rate_limit_from_headers(resp.headers());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HeraldError::rate_limited(endpoint, rate_limit));
        }
        if status == StatusCode::BAD_REQUEST {
            let body = resp.text().await.unwrap_or_default();
            return Err(HeraldError::bad_request(endpoint, body));
        }
        if !status.is_success() {
            return Err(HeraldError::connector(NAME, format!("HTTP {status}")));
        }

        let body = resp.text().await.map_err(|e| transport_error(NAME, &e))?;
        let raw: RawSearch = serde_json::from_str(&body)
            .map_err(|e| HeraldError::Data(format!("{NAME}: undecodable search response: {e}")))?;

        Ok(UpstreamResponse::new(PostSearchPage::from(raw)).with_rate_limit(rate_limit))
    }
}
