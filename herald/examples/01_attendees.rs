mod common;

use herald::Herald;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let herald = Herald::builder().social(common::get_social()).build()?;

    let report = herald.discover_attendees("RustConf 2024", 10).await?;
    println!(
        "{} attendees (limit {}, {} from cache)",
        report.len(),
        report.requested_limit,
        report.cached
    );
    for a in &report.items {
        println!("{:>5.2}  {:<12} {}", a.confidence, a.username, a.source_url);
    }
    for w in &report.warnings {
        println!("warning: {w}");
    }

    // the same request again is answered by the response cache
    let again = herald.discover_attendees("RustConf 2024", 10).await?;
    println!("repeat: {} cached, {} fresh", again.cached, again.fresh);
    Ok(())
}
