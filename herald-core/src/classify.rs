use crate::types::{Attendee, EventCategory};

const CATEGORY_KEYWORDS: &[(EventCategory, &[&str])] = &[
    (
        EventCategory::Music,
        &["concert", "music", "dj", "band", "live music"],
    ),
    (
        EventCategory::Conference,
        &["conference", "summit", "workshop", "business", "tech"],
    ),
    (
        EventCategory::Festival,
        &["festival", "cultural", "celebration"],
    ),
    (
        EventCategory::Sports,
        &["sports", "game", "match", "tournament", "race"],
    ),
    (
        EventCategory::Arts,
        &["art", "theater", "exhibition", "gallery", "museum"],
    ),
    (
        EventCategory::Food,
        &["food", "drink", "culinary", "wine", "beer"],
    ),
    (EventCategory::Family, &["family", "kids", "children"]),
    (EventCategory::Comedy, &["comedy", "standup", "improv"]),
];

/// Phrases that signal intent to attend, grouped by kind.
pub const ATTENDANCE_PHRASES: &[&str] = &[
    // attending
    "attending",
    "going to",
    "see you at",
    "can't wait for",
    "excited for",
    // interested
    "interested in",
    "looking forward to",
    "planning to attend",
    "might go to",
    // organizing
    "organizing",
    "hosting",
    "putting on",
    "running",
];

impl EventCategory {
    /// Classify free text by keyword, first matching category wins.
    ///
    /// Matching is substring based, so "DJ" also matches inside longer words.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map_or(Self::Other, |(category, _)| *category)
    }
}

/// Whether a post mentions the event or an attendance phrase.
///
/// Event words of three characters or fewer are ignored.
#[must_use]
pub fn is_relevant_post(text: &str, event_name: &str) -> bool {
    if text.is_empty() || event_name.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    let event = event_name.to_lowercase();
    if event
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .any(|w| text.contains(w))
    {
        return true;
    }
    ATTENDANCE_PHRASES.iter().any(|p| text.contains(p))
}

/// Confidence that `attendee` is a real, relevant person.
///
/// Base 0.7, +0.2 verified, +0.1 over 1000 followers, +0.1 bio longer than 20
/// characters, +0.1 non-empty location; capped at 0.95.
#[must_use]
pub fn attendee_confidence(attendee: &Attendee) -> f64 {
    let mut score = 0.7;
    if attendee.verified {
        score += 0.2;
    }
    if attendee.followers_count > 1000 {
        score += 0.1;
    }
    if attendee.bio.chars().count() > 20 {
        score += 0.1;
    }
    if !attendee.location.is_empty() {
        score += 0.1;
    }
    f64::min(score, 0.95)
}
