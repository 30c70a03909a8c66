//! Test doubles for the herald workspace.
//!
//! Everything here is deterministic: providers replay scripted behaviors or
//! static fixtures, and [`ManualClock`] only moves when told to.

mod clock;
mod events;
/// Static fixture data.
pub mod fixtures;
mod observer;
mod social;

pub use clock::ManualClock;
pub use events::MockEventSource;
pub use observer::RecordingObserver;
pub use social::{MockBehavior, MockSocialProvider};
