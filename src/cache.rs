//! Time-bounded cache for remote and worker query results.
//!
//! Entries are addressed by a [`CacheKind`] plus a string key and remember when
//! they were fetched. An entry past its TTL, or one that was explicitly
//! invalidated, is *stale*: it can still be shown while a refetch is in flight,
//! but callers should request fresh data.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// TTL for movie detail records.
#[must_use]
pub fn details_ttl() -> Duration {
    Duration::hours(1)
}

/// TTL for the favorites snapshot loaded from the worker.
#[must_use]
pub fn favorites_ttl() -> Duration {
    Duration::minutes(5)
}

/// Entries kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 64;

/// Which family of queries an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKind {
    Details,
    Favorites,
}

/// A cached value with its freshness window.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub fetched_at: DateTime<Utc>,
    pub stale_after: Duration,
    invalidated: bool,
}

impl<V> CacheEntry<V> {
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.invalidated || now - self.fetched_at >= self.stale_after
    }
}

/// `(kind, key) -> entry` map with TTL and a size bound.
#[derive(Debug, Clone)]
pub struct QueryCache<V> {
    entries: BTreeMap<(CacheKind, String), CacheEntry<V>>,
    capacity: usize,
}

impl<V> QueryCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Entry for `(kind, key)`, fresh or stale.
    #[must_use]
    pub fn get(&self, kind: CacheKind, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(&(kind, key.to_string()))
    }

    /// Data for `(kind, key)` only if it is still fresh at `now`.
    #[must_use]
    pub fn fresh(&self, kind: CacheKind, key: &str, now: DateTime<Utc>) -> Option<&V> {
        self.get(kind, key)
            .filter(|entry| !entry.is_stale(now))
            .map(|entry| &entry.data)
    }

    /// Stores `data`, replacing any previous entry, and evicts the oldest entry
    /// when over capacity.
    pub fn insert(
        &mut self,
        kind: CacheKind,
        key: impl Into<String>,
        data: V,
        now: DateTime<Utc>,
        ttl: Duration,
    ) {
        self.entries.insert(
            (kind, key.into()),
            CacheEntry {
                data,
                fetched_at: now,
                stale_after: ttl,
                invalidated: false,
            },
        );

        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    tracing::trace!(kind = ?k.0, key = %k.1, "evicting cache entry");
                    self.entries.remove(&k);
                }
                None => break,
            }
        }
    }

    /// Marks one entry stale; its data stays available.
    pub fn invalidate(&mut self, kind: CacheKind, key: &str) {
        if let Some(entry) = self.entries.get_mut(&(kind, key.to_string())) {
            entry.invalidated = true;
        }
    }

    /// Marks every entry of `kind` stale.
    pub fn invalidate_kind(&mut self, kind: CacheKind) {
        self.entries
            .iter_mut()
            .filter(|((k, _), _)| *k == kind)
            .for_each(|(_, entry)| entry.invalidated = true);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn entries_go_stale_after_ttl() {
        let mut cache = QueryCache::new();
        cache.insert(CacheKind::Details, "603", "matrix", t0(), details_ttl());

        assert_eq!(cache.fresh(CacheKind::Details, "603", t0()), Some(&"matrix"));
        let later = t0() + Duration::minutes(59);
        assert!(cache.fresh(CacheKind::Details, "603", later).is_some());
        let expired = t0() + Duration::hours(1);
        assert!(cache.fresh(CacheKind::Details, "603", expired).is_none());
        assert!(cache.get(CacheKind::Details, "603").is_some());
    }

    #[test]
    fn invalidation_keeps_data_but_marks_stale() {
        let mut cache = QueryCache::new();
        cache.insert(CacheKind::Favorites, "", 3, t0(), favorites_ttl());
        cache.insert(CacheKind::Details, "1", 1, t0(), details_ttl());

        cache.invalidate_kind(CacheKind::Favorites);
        assert!(cache.fresh(CacheKind::Favorites, "", t0()).is_none());
        assert_eq!(cache.get(CacheKind::Favorites, "").map(|e| e.data), Some(3));
        assert!(cache.fresh(CacheKind::Details, "1", t0()).is_some());

        cache.invalidate(CacheKind::Details, "1");
        assert!(cache.fresh(CacheKind::Details, "1", t0()).is_none());
    }

    #[test]
    fn reinsert_clears_invalidation() {
        let mut cache = QueryCache::new();
        cache.insert(CacheKind::Details, "1", 1, t0(), details_ttl());
        cache.invalidate(CacheKind::Details, "1");
        cache.insert(CacheKind::Details, "1", 2, t0(), details_ttl());
        assert_eq!(cache.fresh(CacheKind::Details, "1", t0()), Some(&2));
    }

    #[test]
    fn oldest_entry_is_evicted_over_capacity() {
        let mut cache = QueryCache::with_capacity(2);
        cache.insert(CacheKind::Details, "a", 1, t0(), details_ttl());
        cache.insert(CacheKind::Details, "b", 2, t0() + Duration::seconds(1), details_ttl());
        cache.insert(CacheKind::Details, "c", 3, t0() + Duration::seconds(2), details_ttl());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(CacheKind::Details, "a").is_none());
        assert!(cache.get(CacheKind::Details, "c").is_some());
    }
}
