use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quota::RateLimitInfo;

/// Unified error type for the herald workspace.
///
/// Upstream failures are classified into the variants the guarded caller
/// understands (`TooManyRequests`, `BadRequest`, everything else), plus the
/// argument and setup errors surfaced by the discovery engines.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeraldError {
    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the returned or expected data (undecodable body, missing fields).
    #[error("data issue: {0}")]
    Data(String),

    /// The local quota budget for an endpoint is exhausted.
    #[error("quota exceeded for {endpoint}: reset_in_ms={reset_in_ms}")]
    QuotaExceeded {
        /// Endpoint whose budget is exhausted.
        endpoint: String,
        /// Milliseconds until the quota window resets.
        reset_in_ms: u64,
    },

    /// Upstream answered with a "too many requests" signal.
    #[error("too many requests: {endpoint}")]
    TooManyRequests {
        /// Endpoint that was throttled.
        endpoint: String,
        /// Rate-limit metadata reported with the rejection, if any.
        #[serde(default)]
        rate_limit: Option<RateLimitInfo>,
    },

    /// Upstream rejected the request as malformed; retrying will not help.
    #[error("bad request to {endpoint}: {msg}")]
    BadRequest {
        /// Endpoint that rejected the request.
        endpoint: String,
        /// Upstream message, if any.
        msg: String,
    },

    /// An individual connector failed (transport, unexpected status, ...).
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The upstream client never became operational (missing credentials, setup failure).
    #[error("upstream not operational: {connector}")]
    NotOperational {
        /// Connector name that is not operational.
        connector: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl HeraldError {
    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `TooManyRequests` error for an endpoint.
    pub fn too_many_requests(endpoint: impl Into<String>) -> Self {
        Self::TooManyRequests {
            endpoint: endpoint.into(),
            rate_limit: None,
        }
    }

    /// Helper: build a `TooManyRequests` error carrying the upstream's rate-limit metadata.
    pub fn rate_limited(endpoint: impl Into<String>, info: RateLimitInfo) -> Self {
        Self::TooManyRequests {
            endpoint: endpoint.into(),
            rate_limit: (!info.is_empty()).then_some(info),
        }
    }

    /// Rate-limit metadata attached to a throttling error.
    #[must_use]
    pub const fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            Self::TooManyRequests {
                rate_limit: Some(info),
                ..
            } => Some(info),
            _ => None,
        }
    }

    /// Helper: build a `BadRequest` error for an endpoint.
    pub fn bad_request(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::BadRequest {
            endpoint: endpoint.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotOperational` error for a connector.
    pub fn not_operational(connector: impl Into<String>) -> Self {
        Self::NotOperational {
            connector: connector.into(),
        }
    }

    /// Returns true if a second attempt may succeed.
    ///
    /// Malformed requests, invalid arguments and non-operational clients fail
    /// the same way every time and are never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::BadRequest { .. } | Self::InvalidArg(_) | Self::NotOperational { .. }
        )
    }

    /// Returns true for errors caused by the caller rather than by an upstream.
    ///
    /// These are the only errors the discovery engines surface as `Err`.
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(self, Self::InvalidArg(_))
    }
}
