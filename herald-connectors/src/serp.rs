use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use herald_core::{
    CategoryFilter, Clock, EventCategory, EventFetch, EventListing, EventListingProvider,
    HeraldError, SystemClock,
};

use crate::dates::{extract_date_from_text, parse_event_date};
use crate::{DEFAULT_TIMEOUT, build_http, endpoint_url, parse_base, transport_error};

const NAME: &str = "herald-serp-events";
const DEFAULT_BASE: &str = "https://serpapi.com/";
const SOURCE_LABEL: &str = "Google Events";
const LISTING_CONFIDENCE: f64 = 0.85;

/// Why a listing was dropped while parsing a response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    /// The item did not have the expected shape.
    Malformed(String),
    /// Empty or placeholder title.
    MissingTitle,
    /// Dated outside the requested range.
    OutOfRange(NaiveDate),
}

/// Result of parsing a single listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// A usable listing.
    Parsed(EventListing),
    /// A dropped listing.
    Skipped(SkipReason),
}

/// Event listings from a google-events style search API.
///
/// Issues up to `count` searches per fetch (one per generated query), skipping
/// queries that fail, and stops early once twice the wanted number of listings
/// has been collected.
#[derive(Debug, Clone)]
pub struct SerpEventsConnector {
    http: Option<reqwest::Client>,
    base: url::Url,
    api_key: Option<String>,
    clock: Arc<dyn Clock>,
}

/// Builder for [`SerpEventsConnector`].
#[derive(Debug, Clone)]
pub struct SerpEventsConnectorBuilder {
    base: String,
    api_key: Option<String>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for SerpEventsConnectorBuilder {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }
}

impl SerpEventsConnectorBuilder {
    /// API key sent with every search.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k| !k.trim().is_empty());
        self
    }

    /// API base URL.
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

    /// Clock supplying "today" for listings without a recognizable date.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns `HeraldError::InvalidArg` when the base URL does not parse.
    pub fn build(self) -> Result<SerpEventsConnector, HeraldError> {
        Ok(SerpEventsConnector {
            http: build_http(self.timeout),
            base: parse_base(NAME, &self.base)?,
            api_key: self.api_key,
            clock: self.clock,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    events_results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: Option<RawDate>,
    #[serde(default)]
    address: Option<RawAddress>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Detail {
        #[serde(default)]
        start_date: Option<String>,
        #[serde(default)]
        when: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Line(String),
    Lines(Vec<String>),
}

impl RawDate {
    fn parse(&self) -> Option<NaiveDate> {
        match self {
            Self::Text(s) => parse_event_date(s),
            Self::Detail { start_date, when } => start_date
                .as_deref()
                .and_then(parse_event_date)
                .or_else(|| when.as_deref().and_then(parse_event_date)),
        }
    }
}

impl RawAddress {
    fn joined(self) -> String {
        match self {
            Self::Line(s) => s,
            Self::Lines(lines) => lines.join(", "),
        }
    }
}

/// Search queries for a location, generic ones first, then category extras.
///
/// Music, sports and food extras are added when that category (or every
/// category) is requested.
#[must_use]
pub fn build_queries(location: &str, start: NaiveDate, category: CategoryFilter) -> Vec<String> {
    let month = start.format("%B %Y").to_string();
    let mut queries = vec![
        format!("events in {location}"),
        format!("upcoming events {location}"),
        format!("things to do in {location}"),
        format!("{location} events {month}"),
        format!("concerts in {location}"),
        format!("festivals {location}"),
        format!("shows in {location}"),
        format!("entertainment {location}"),
        format!("nightlife {location}"),
        format!("cultural events {location}"),
    ];
    if category.includes(EventCategory::Music) {
        queries.extend([
            format!("concerts {location} {month}"),
            format!("music events {location}"),
            format!("live music {location}"),
        ]);
    }
    if category.includes(EventCategory::Sports) {
        queries.extend([
            format!("sports events {location}"),
            format!("games {location} {month}"),
        ]);
    }
    if category.includes(EventCategory::Food) {
        queries.extend([
            format!("food festivals {location}"),
            format!("culinary events {location}"),
        ]);
    }
    queries
}

/// Turn one raw listing into an [`EventListing`].
///
/// The date comes from the `date` field, else from the description, else
/// `today`. Listings dated outside `[start, end]` are skipped.
#[must_use]
pub fn parse_item(
    raw: &serde_json::Value,
    location: &str,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> ItemOutcome {
    let event: RawEvent = match serde_json::from_value(raw.clone()) {
        Ok(e) => e,
        Err(e) => return ItemOutcome::Skipped(SkipReason::Malformed(e.to_string())),
    };
    let title = event.title.trim();
    if title.is_empty() || title == "Unknown" {
        return ItemOutcome::Skipped(SkipReason::MissingTitle);
    }
    let description = event.description.unwrap_or_default();
    let date = event
        .date
        .as_ref()
        .and_then(RawDate::parse)
        .or_else(|| extract_date_from_text(&description))
        .unwrap_or(today);
    if date < start || date > end {
        return ItemOutcome::Skipped(SkipReason::OutOfRange(date));
    }
    ItemOutcome::Parsed(EventListing {
        name: title.to_string(),
        date,
        venue: event
            .address
            .map(RawAddress::joined)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| location.to_string()),
        location: location.to_string(),
        category: EventCategory::classify(title),
        link: event.link.unwrap_or_default(),
        description,
        confidence: LISTING_CONFIDENCE,
        posted_by: SOURCE_LABEL.to_string(),
    })
}

impl SerpEventsConnector {
    /// Connector name used in errors and logs.
    pub const NAME: &'static str = NAME;

    /// Start configuring a connector.
    #[must_use]
    pub fn builder() -> SerpEventsConnectorBuilder {
        SerpEventsConnectorBuilder::default()
    }

    /// Connector against the public API using `SERP_API_KEY`.
    ///
    /// # Errors
    /// Propagates [`SerpEventsConnectorBuilder::build`] failures.
    pub fn from_env() -> Result<Self, HeraldError> {
        let builder = Self::builder();
        match std::env::var("SERP_API_KEY") {
            Ok(key) => builder.api_key(key).build(),
            Err(_) => builder.build(),
        }
    }

    async fn search(
        &self,
        http: &reqwest::Client,
        api_key: &str,
        query: &str,
        location: &str,
    ) -> Result<Vec<serde_json::Value>, HeraldError> {
        let mut url = endpoint_url(NAME, &self.base, "search")?;
        url.query_pairs_mut()
            .append_pair("engine", "google_events")
            .append_pair("q", query)
            .append_pair("location", location)
            .append_pair("hl", "en")
            .append_pair("api_key", api_key);

        let resp = http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(NAME, &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HeraldError::connector(NAME, format!("HTTP {status}")));
        }
        let body = resp.text().await.map_err(|e| transport_error(NAME, &e))?;
        let raw: RawResponse = serde_json::from_str(&body)
            .map_err(|e| HeraldError::Data(format!("{NAME}: undecodable response: {e}")))?;
        if let Some(error) = raw.error {
            return Err(HeraldError::connector(NAME, error));
        }
        Ok(raw.events_results)
    }
}

#[async_trait]
impl EventListingProvider for SerpEventsConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_operational(&self) -> bool {
        self.http.is_some() && self.api_key.is_some()
    }

    async fn fetch_events(&self, request: &EventFetch) -> Result<Vec<EventListing>, HeraldError> {
        let (Some(http), Some(api_key)) = (&self.http, &self.api_key) else {
            return Err(HeraldError::not_operational(NAME));
        };
        if request.count == 0 {
            return Ok(Vec::new());
        }
        let today = self.clock.now().date_naive();
        let queries = build_queries(&request.location, request.start, request.category);

        let mut listings = Vec::new();
        let mut answered = 0usize;
        let mut last_error = None;
        for query in queries.iter().take(request.count) {
            let items = match self.search(http, api_key, query, &request.location).await {
                Ok(items) => items,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(connector = NAME, query = %query, error = %e, "event search failed");
                    last_error = Some(e);
                    continue;
                }
            };
            answered += 1;
            for raw in &items {
                match parse_item(raw, &request.location, request.start, request.end, today) {
                    ItemOutcome::Parsed(listing) => listings.push(listing),
                    ItemOutcome::Skipped(_reason) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(connector = NAME, reason = ?_reason, "skipped listing");
                    }
                }
            }
            if listings.len() >= request.count.saturating_mul(2) {
                break;
            }
        }

        if answered == 0
            && let Some(error) = last_error
        {
            return Err(error);
        }
        listings.truncate(request.count);
        Ok(listings)
    }
}
