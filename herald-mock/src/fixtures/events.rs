use chrono::NaiveDate;
use herald_core::{EventCategory, EventListing};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// A listing with fixture defaults; the category is derived from the name.
#[must_use]
pub fn listing(name: &str, location: &str, on: NaiveDate) -> EventListing {
    EventListing {
        name: name.to_string(),
        date: on,
        venue: format!("{location} Hall"),
        location: location.to_string(),
        category: EventCategory::classify(name),
        link: format!("https://events.example/{}", name.to_lowercase().replace(' ', "-")),
        description: format!("{name} in {location}"),
        confidence: 0.85,
        posted_by: "Google Events".to_string(),
    }
}

/// Listings for Austin and Berlin across January and February 2024.
#[must_use]
pub fn catalogue() -> Vec<EventListing> {
    vec![
        listing("Jazz Concert", "Austin", date(2024, 1, 5)),
        listing("Tech Summit", "Austin", date(2024, 1, 12)),
        listing("Food Truck Rally", "Austin", date(2024, 1, 20)),
        listing("Marathon Race", "Austin", date(2024, 1, 28)),
        listing("Gallery Night", "Austin", date(2024, 2, 3)),
        listing("Comedy Hour", "Austin", date(2024, 2, 10)),
        listing("Kids Science Fair", "Austin", date(2024, 2, 17)),
        listing("Winter Festival", "Berlin", date(2024, 1, 14)),
        listing("Techno DJ Set", "Berlin", date(2024, 1, 21)),
        listing("Museum Late", "Berlin", date(2024, 2, 8)),
    ]
}
