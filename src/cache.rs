//! In-memory result cache keyed by the raw request URI.
//!
//! Entries expire after a fixed TTL (checked on read) and the cache never
//! holds more than `capacity` entries. When full, expired entries are purged
//! first and then the oldest insertion is evicted.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug)]
struct Entry {
    value: String,
    stored_at: Instant,
    sequence: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    next_sequence: u64,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut state = self.lock();

        let expired = match state.entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
        }
        None
    }

    pub fn store(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let now = Instant::now();
        let mut state = self.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            let ttl = self.ttl;
            state
                .entries
                .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);

            if state.entries.len() >= self.capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.sequence)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    state.entries.remove(&oldest);
                }
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(
            key,
            Entry {
                value: value.into(),
                stored_at: now,
                sequence,
            },
        );
    }

    /// Number of stored entries, including ones that expired but were not
    /// read since.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Critical sections never leave the map half-updated, so a poisoned
        // lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn store_then_lookup_returns_value() {
        let cache = ResultCache::default();
        cache.store("mcp://weather/current/Paris", "Clear sky, 18°C");

        assert_eq!(
            cache.lookup("mcp://weather/current/Paris").as_deref(),
            Some("Clear sky, 18°C")
        );
        assert_eq!(cache.lookup("mcp://weather/current/Rome"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ResultCache::new(Duration::from_secs(300), 10);
        cache.store("key", "value");

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.lookup("key").as_deref(), Some("value"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.lookup("key"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_refreshes_value_and_age() {
        let cache = ResultCache::new(Duration::from_secs(10), 10);
        cache.store("key", "old");
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.store("key", "new");
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.lookup("key").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_oldest_insertion_when_full() {
        let cache = ResultCache::new(Duration::from_secs(300), 3);
        for key in ["a", "b", "c", "d"] {
            cache.store(key, key.to_uppercase());
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.lookup("a"), None);
        assert_eq!(cache.lookup("b").as_deref(), Some("B"));
        assert_eq!(cache.lookup("d").as_deref(), Some("D"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_purged_before_evicting_live_ones() {
        let cache = ResultCache::new(Duration::from_secs(10), 2);
        cache.store("stale", "1");
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.store("live", "2");
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.store("fresh", "3");

        assert_eq!(cache.lookup("live").as_deref(), Some("2"));
        assert_eq!(cache.lookup("fresh").as_deref(), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn size_never_exceeds_capacity_under_concurrency() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(300), 16));
        let mut tasks = Vec::new();
        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            tasks.push(tokio::spawn(async move {
                for item in 0..50 {
                    cache.store(format!("{worker}-{item}"), "value");
                    assert!(cache.len() <= cache.capacity());
                }
            }));
        }
        for task in tasks {
            task.await.expect("worker task");
        }

        assert_eq!(cache.len(), 16);
    }
}
