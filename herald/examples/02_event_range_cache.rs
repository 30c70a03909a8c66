mod common;

use chrono::NaiveDate;
use herald::{CategoryFilter, EventQuery, Herald};

fn day(m: u32, d: u32) -> Result<NaiveDate, &'static str> {
    NaiveDate::from_ymd_opt(2024, m, d).ok_or("bad date")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let herald = Herald::builder().events(common::get_events()).build()?;

    let january = EventQuery::new("Austin", day(1, 1)?, day(1, 31)?).max_results(3);
    let overlap = EventQuery::new("Austin", day(1, 15)?, day(2, 15)?)
        .category(CategoryFilter::All)
        .max_results(4);

    for query in [&january, &january, &overlap] {
        let report = herald.discover_events(query).await?;
        println!(
            "{} {}..{}: {} events ({} cached, {} fresh)",
            query.location,
            query.start,
            query.end,
            report.len(),
            report.cached,
            report.fresh
        );
        for e in &report.items {
            println!("  {}  {:<20} [{}]", e.date, e.name, e.category);
        }
    }

    let stats = herald.status().range_cache;
    for (group, s) in &stats.groups {
        println!("{group}: {} ranges, {} items", s.cached_ranges, s.total_items);
    }
    Ok(())
}
