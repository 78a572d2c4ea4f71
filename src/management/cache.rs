use std::{collections::HashMap, hash::Hash, time::Duration};

use tokio::time::Instant;

/// Map of key to (expiry instant, value).
///
/// Entries are dropped lazily: an expired entry is never returned and is
/// removed on the next write or [`TtlCache::purge_expired`]. Not synchronized;
/// share it behind a mutex.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (Instant, V)>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(expires_at, _)| Instant::now() < *expires_at)
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.purge_expired();
        self.entries.insert(key, (Instant::now() + self.ttl, value));
    }

    /// Removes the entry, returning it only if it had not expired yet.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (expires_at, value) = self.entries.remove(key)?;
        (Instant::now() < expires_at).then_some(value)
    }

    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, (expires_at, _)| now < *expires_at);
    }

    /// Number of stored entries, including expired ones not purged yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
