mod common;

use chrono::NaiveDate;
use herald::{EventQuery, Herald, TracingObserver};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,herald=trace,herald_middleware=trace
    // Spans and middleware events need `--features herald/tracing`.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let herald = Herald::builder()
        .social(common::get_social())
        .events(common::get_events())
        .observer(Arc::new(TracingObserver))
        .build()?;

    let _ = herald.discover_attendees("RustConf 2024", 5).await?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let end = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?;
    let _ = herald
        .discover_events(&EventQuery::new("Austin", start, end))
        .await?;

    Ok(())
}
