//! Discovery engines built on the guarded caller and the range cache.

pub(crate) mod attendees;
pub(crate) mod events;
