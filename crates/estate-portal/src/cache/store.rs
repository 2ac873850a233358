use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::key::QueryKey;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.invalidated && self.stored_at.elapsed() < ttl
    }
}

/// Response cache keyed by [`QueryKey`].
///
/// Writes are last-resolved-wins: a slow response for a key overwrites a faster,
/// newer one. Invalidation marks entries stale instead of dropping them so the
/// last known value stays readable until the next fetch resolves.
///
/// The cache holds at most `max_entries` keys. Storing a new key into a full
/// cache first drops every stale entry, then the oldest ones.
#[derive(Debug)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

pub const DEFAULT_MAX_ENTRIES: usize = 512;

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// A `max_entries` of zero is treated as one.
    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Last stored value, fresh or not.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        let guard = self.entries.read().expect("cache lock poisoned");
        guard.get(key).map(|entry| entry.value.clone())
    }

    /// Stored value only while it is younger than the TTL and not invalidated.
    pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
        let guard = self.entries.read().expect("cache lock poisoned");
        guard
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        let guard = self.entries.read().expect("cache lock poisoned");
        guard.get(key).map(|entry| !entry.is_fresh(self.ttl))
    }

    pub fn store(&self, key: QueryKey, value: Value) {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        if !guard.contains_key(&key) && guard.len() >= self.max_entries {
            let evicted = evict(&mut guard, self.ttl, self.max_entries - 1);
            tracing::debug!(evicted, remaining = guard.len(), "cache full");
        }
        guard.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Mark every entry under `prefix` stale. Returns how many entries matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        let mut matched = 0;
        for (key, entry) in guard.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                matched += 1;
            }
        }
        tracing::debug!(%prefix, matched, "cache invalidated");
        matched
    }

    /// Drop every entry under `prefix`. Returns how many entries were removed.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut guard = self.entries.write().expect("cache lock poisoned");
        let before = guard.len();
        guard.retain(|key, _| !key.starts_with(prefix));
        before - guard.len()
    }

    pub fn clear(&self) {
        self.entries.write().expect("cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shrink `entries` to `target`: stale entries go first, then the oldest.
fn evict(entries: &mut HashMap<QueryKey, CacheEntry>, ttl: Duration, target: usize) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.is_fresh(ttl));

    while entries.len() > target {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                entries.remove(&key);
            }
            None => break,
        }
    }
    before - entries.len()
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
