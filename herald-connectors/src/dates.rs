use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
];

/// Parse a listing date.
///
/// Ranges ("X to Y", "X - Y") yield their start. Formats are tried in order, so
/// an ambiguous `03/04/2024` is read month-first.
#[must_use]
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let mut text = raw.trim();
    if let Some((start, _)) = text.split_once(" to ") {
        text = start.trim();
    } else if let Some((start, _)) = text.split_once(" - ") {
        text = start.trim();
    }
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn description_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(\d{4}-\d{2}-\d{2})",
            r"(\d{1,2}/\d{1,2}/\d{4})",
            r"(\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{4})",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Find the first recognizable date in free text.
///
/// Patterns are tried in order (ISO, numeric, day-month-year); the first
/// pattern that matches decides, even if its match then fails to parse.
#[must_use]
pub fn extract_date_from_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    description_patterns()
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_event_date(m.as_str()))
}
