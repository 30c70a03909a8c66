//! herald-core
//!
//! Core types, traits, and utilities shared across the herald ecosystem.
//!
//! - `types`: domain items (posts, users, attendees, event listings) and the
//!   `UpstreamResponse` envelope carrying rate-limit metadata.
//! - `connector`: the provider traits implemented by upstream connectors.
//! - `clock`: the time source used for quota and TTL arithmetic.
//! - `observe`: the diagnostics hook injected into the middleware.
//! - `dedup` / `classify`: result deduplication and the text heuristics used to
//!   tag and score results.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Provider traits are `async_trait` based and the middleware sleeps with
//! `tokio::time`, so callers must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Text heuristics: event categories, post relevance, attendee scoring.
pub mod classify;
/// Time source abstraction.
pub mod clock;
/// Provider traits implemented by upstream connectors.
pub mod connector;
/// Deduplication of dated results.
pub mod dedup;
/// Diagnostics events and observers.
pub mod observe;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use connector::{EventFetch, EventListingProvider, SocialSearchProvider};
pub use dedup::dedup_by_name_and_date;
pub use observe::{CoreEvent, NoopObserver, Observer, TracingObserver};
pub use types::*;
