use std::sync::{Mutex, MutexGuard, PoisonError};

use herald_core::{CoreEvent, Observer};

/// Observer that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CoreEvent>>,
}

impl RecordingObserver {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CoreEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<CoreEvent> {
        self.lock().clone()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&CoreEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: &CoreEvent) {
        self.lock().push(event.clone());
    }
}
