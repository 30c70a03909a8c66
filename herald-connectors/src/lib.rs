//! herald-connectors
//!
//! reqwest-based clients for the upstreams herald discovers from:
//!
//! - [`TwitterConnector`]: recent-post search with bearer authentication. Each
//!   call is a single upstream invocation and reports the `x-rate-limit-*`
//!   headers so the guarded caller can refresh its quota state.
//! - [`SerpEventsConnector`]: google-events style listing search.
//!
//! HTTP failures are classified into `HeraldError` so that retry decisions can
//! be made without looking at status codes.
#![warn(missing_docs)]

/// Lenient date parsing for listing payloads.
pub mod dates;
/// Event-listing search connector.
pub mod serp;
/// Recent-post search connector.
pub mod twitter;

use std::time::Duration;

use herald_core::HeraldError;

pub use serp::{ItemOutcome, SerpEventsConnector, SerpEventsConnectorBuilder, SkipReason};
pub use twitter::{TwitterConnector, TwitterConnectorBuilder};

/// Default per-request timeout of the connectors.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

fn build_http(timeout: Duration) -> Option<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build().ok()
}

fn parse_base(connector: &'static str, raw: &str) -> Result<url::Url, HeraldError> {
    let mut url = url::Url::parse(raw)
        .map_err(|e| HeraldError::InvalidArg(format!("{connector}: invalid base url {raw}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn endpoint_url(connector: &'static str, base: &url::Url, path: &str) -> Result<url::Url, HeraldError> {
    base.join(path)
        .map_err(|e| HeraldError::InvalidArg(format!("{connector}: invalid endpoint {path}: {e}")))
}

fn transport_error(connector: &'static str, err: &reqwest::Error) -> HeraldError {
    if err.is_timeout() {
        HeraldError::connector(connector, format!("timeout: {err}"))
    } else {
        HeraldError::connector(connector, err.to_string())
    }
}
