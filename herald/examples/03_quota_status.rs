mod common;

use herald::{CacheQuotaOrdering, EndpointQuota, Herald, QuotaConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A deliberately small budget so the status output is easy to follow.
    let quota = QuotaConfig::default().with_endpoint(
        QuotaConfig::SEARCH_RECENT,
        EndpointQuota::new(5, Duration::from_secs(15 * 60)),
    );
    let herald = Herald::builder()
        .social(common::get_social())
        .quota(quota)
        .ordering(CacheQuotaOrdering::CacheFirst)
        .build()?;

    for name in ["RustConf 2024", "RustConf 2024", "EuroRust 2024"] {
        let report = herald.discover_attendees(name, 5).await?;
        println!("{name}: {} attendees, {} cached", report.len(), report.cached);
    }

    let status = herald.status();
    for (endpoint, q) in &status.quotas {
        println!("{endpoint}: {}/{} remaining", q.remaining, q.limit);
    }
    println!("cached responses: {}", status.response_cache_entries);
    println!("swept: {}", herald.sweep_expired());
    Ok(())
}
