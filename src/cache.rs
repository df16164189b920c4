// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Insert-with-TTL map.
//!
//! Entries are kept ordered by key, so iteration is already sorted.
//! Expiry is lazy: reads return every entry, expired or not, and entries
//! only disappear when [`ExpiringCache::delete_expired`] sweeps them.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Map whose entries expire a fixed time after their last write
#[derive(Debug, Clone)]
pub struct ExpiringCache<K, V> {
    entries: BTreeMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Ord, V> ExpiringCache<K, V> {
    /// Create an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: BTreeMap::new(),
            ttl,
        }
    }

    /// Insert or overwrite `key`, refreshing its expiry
    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert as if the current time were `now`
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Get a value, whether or not it has expired
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Iterate over every entry still held, in ascending key order
    pub fn items(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, entry)| (key, &entry.value))
    }

    /// Number of entries held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time-to-live applied on insert
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Remove expired entries, returning how many were dropped
    pub fn delete_expired(&mut self) -> usize {
        self.delete_expired_at(Instant::now())
    }

    /// Remove entries expired as of `now`
    pub fn delete_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
