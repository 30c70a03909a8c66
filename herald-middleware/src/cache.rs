use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use herald_core::clock::elapsed_between;
use herald_core::{CacheConfig, Clock};
use lru::LruCache;

struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Time-boxed store for verbatim upstream responses.
///
/// Expired entries are logically absent as soon as their TTL elapses; they are
/// physically removed on the next `get` for their key, by
/// [`sweep_expired`](Self::sweep_expired), or as the least recently used entry
/// once the store is full.
pub struct ResponseCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<LruCache<String, Entry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create an empty cache holding at most `max_entries` responses (never
    /// fewer than one). A zero TTL disables caching entirely.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl: config.ttl,
            clock,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        elapsed_between(entry.stored_at, now) >= self.ttl
    }

    /// Configured time-to-live.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Maximum number of held responses.
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Fetch a live entry, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let expired = self.is_expired(entries.peek(key)?, now);
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// At capacity an expired entry is dropped first; only when none has expired
    /// does the least recently used live entry make room.
    pub fn set(&self, key: &str, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let now = self.clock.now();
        let mut entries = self.lock();
        if entries.len() == entries.cap().get() && !entries.contains(key) {
            let expired = entries
                .iter()
                .rev()
                .find(|(_, e)| self.is_expired(e, now))
                .map(|(k, _)| k.clone());
            if let Some(k) = expired {
                entries.pop(&k);
            }
        }
        entries.put(
            key.to_string(),
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Remove every expired entry and return how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| self.is_expired(e, now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Physical entry count, including expired entries not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field(
                "capacity",
                &self.entries.lock().unwrap_or_else(PoisonError::into_inner).cap(),
            )
            .finish_non_exhaustive()
    }
}
