use std::sync::Arc;

use herald_core::classify::{attendee_confidence, is_relevant_post};
use herald_core::{
    Attendee, CoreEvent, DiscoveryReport, HeraldError, PostSearchPage, QuotaConfig, SearchQuery,
};

use crate::Herald;

/// Lower bound on posts requested per search.
const MIN_POSTS_PER_SEARCH: usize = 10;
/// Upper bound on posts requested per search.
const MAX_POSTS_PER_SEARCH: usize = 100;

/// Keep word characters and whitespace.
pub(crate) fn clean_event_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn attendee_query(clean: &str, limit: usize) -> SearchQuery {
    let posts = (limit * 3).clamp(MIN_POSTS_PER_SEARCH, MAX_POSTS_PER_SEARCH);
    SearchQuery::new(
        format!("\"{clean}\" OR attending \"{clean}\" -is:retweet"),
        u32::try_from(posts).unwrap_or(u32::MAX),
    )
}

/// Relevant posts joined to their authors, scored, best first.
///
/// Posts whose author is missing from the page are skipped. Equal scores keep
/// page order.
pub(crate) fn extract_attendees(page: &PostSearchPage, event_name: &str) -> Vec<Attendee> {
    let mut attendees: Vec<Attendee> = page
        .posts
        .iter()
        .filter(|post| is_relevant_post(&post.text, event_name))
        .filter_map(|post| {
            let user = page.author_of(post)?;
            let mut attendee = Attendee {
                name: user.name.clone(),
                username: format!("@{}", user.username),
                bio: user.bio.clone(),
                location: user.location.clone(),
                followers_count: user.followers_count,
                verified: user.verified,
                confidence: 0.0,
                source_url: format!("https://twitter.com/{}/status/{}", user.username, post.id),
                posted_by: format!("@{}", user.username),
            };
            attendee.confidence = attendee_confidence(&attendee);
            Some(attendee)
        })
        .collect();
    attendees.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    attendees
}

impl Herald {
    /// Discover people likely attending `event_name`.
    ///
    /// Behavior and trade-offs:
    /// - `max_results` is capped by `limits.max_attendees` (30 by default).
    /// - A missing or non-operational social provider yields an empty report
    ///   with a `NotOperational` warning; no quota is consumed.
    /// - One search of `clamp(3 * limit, 10, 100)` posts is issued through the
    ///   guarded caller, so a repeat of the same request within the cache TTL is
    ///   served without an upstream call.
    /// - Upstream failures are listed in `warnings` and yield an empty report.
    ///
    /// # Errors
    /// Never returns `Err` for upstream failures; those are reported in
    /// `warnings`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "herald::discovery::attendees",
            skip_all,
            fields(event = %event_name, max_results = max_results),
        )
    )]
    pub async fn discover_attendees(
        &self,
        event_name: &str,
        max_results: usize,
    ) -> Result<DiscoveryReport<Attendee>, HeraldError> {
        let limit = max_results.min(self.cfg.limits.max_attendees);
        let provider = match self.social.as_ref() {
            Some(provider) if provider.is_operational() => provider,
            other => {
                let connector = other.map_or("social", |p| p.name());
                self.observer.observe(&CoreEvent::NotOperational {
                    connector: connector.to_string(),
                });
                return Ok(DiscoveryReport::empty(limit)
                    .with_warning(HeraldError::not_operational(connector)));
            }
        };

        let clean = clean_event_name(event_name);
        if limit == 0 || clean.is_empty() {
            return Ok(DiscoveryReport::empty(limit));
        }

        let query = attendee_query(&clean, limit);
        let key = query.cache_key();
        let served = self
            .social_caller
            .call_served(QuotaConfig::SEARCH_RECENT, Some(&key), || {
                let provider = Arc::clone(provider);
                let query = query.clone();
                async move { provider.search_recent(&query).await }
            })
            .await;

        let served = match served {
            Ok(served) => served,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "attendee search failed; returning no results");
                return Ok(DiscoveryReport::empty(limit).with_warning(e));
            }
        };

        let mut items = extract_attendees(&served.value, event_name);
        items.truncate(limit);
        let count = items.len();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attendees = count,
            posts = served.value.posts.len(),
            from_cache = served.from_cache,
            "attendee discovery finished"
        );
        Ok(DiscoveryReport {
            items,
            requested_limit: limit,
            cached: if served.from_cache { count } else { 0 },
            fresh: if served.from_cache { 0 } else { count },
            warnings: Vec::new(),
        })
    }
}
