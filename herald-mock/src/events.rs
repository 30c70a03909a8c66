use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use herald_core::{EventFetch, EventListing, EventListingProvider, HeraldError};

use crate::fixtures;

/// Event-listing provider backed by an in-memory catalogue.
///
/// Returns catalogue entries for the requested location, inside the requested
/// range and category, in catalogue order, truncated to the requested count.
#[derive(Debug)]
pub struct MockEventSource {
    catalogue: Vec<EventListing>,
    failures: Mutex<VecDeque<HeraldError>>,
    requests: Mutex<Vec<EventFetch>>,
    calls: AtomicUsize,
    operational: AtomicBool,
}

impl Default for MockEventSource {
    fn default() -> Self {
        Self::new(fixtures::events::catalogue())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockEventSource {
    /// Source serving `catalogue`.
    #[must_use]
    pub const fn new(catalogue: Vec<EventListing>) -> Self {
        Self {
            catalogue,
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            operational: AtomicBool::new(true),
        }
    }

    /// Toggle the operational flag.
    pub fn set_operational(&self, operational: bool) {
        self.operational.store(operational, Ordering::SeqCst);
    }

    /// Fail the next call with `error`.
    pub fn fail_next(&self, error: HeraldError) {
        lock(&self.failures).push_back(error);
    }

    /// Number of `fetch_events` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received, in call order.
    pub fn requests(&self) -> Vec<EventFetch> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl EventListingProvider for MockEventSource {
    fn name(&self) -> &'static str {
        "herald-mock-events"
    }

    fn is_operational(&self) -> bool {
        self.operational.load(Ordering::SeqCst)
    }

    async fn fetch_events(&self, request: &EventFetch) -> Result<Vec<EventListing>, HeraldError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request.clone());
        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }
        Ok(self
            .catalogue
            .iter()
            .filter(|e| e.location.eq_ignore_ascii_case(&request.location))
            .filter(|e| request.start <= e.date && e.date <= request.end)
            .filter(|e| request.category.includes(e.category))
            .take(request.count)
            .cloned()
            .collect())
    }
}
