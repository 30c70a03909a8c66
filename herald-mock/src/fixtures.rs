/// Event-listing catalogue.
pub mod events;
/// Social search pages.
pub mod posts;
