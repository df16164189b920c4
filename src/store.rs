// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sample history store
//!
//! Recent samples are kept per metric identity, keyed by timestamp, in an
//! [`ExpiringCache`] of their own. Two sweeps bound memory:
//! - [`SampleStore::expire`] drops samples older than the expiration time
//! - [`SampleStore::cleanup`] drops identities left without samples
//!
//! Neither runs on its own; the owner (or a
//! [`Housekeeper`](crate::housekeeping::Housekeeper)) calls them periodically.

use crate::cache::ExpiringCache;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::sample::{Sample, Timestamp};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Snapshot of one identity's history, ordered by timestamp
pub type History = BTreeMap<Timestamp, f64>;

/// Keyed collection of recent samples per metric identity
#[derive(Debug, Clone)]
pub struct SampleStore {
    config: StoreConfig,
    histories: HashMap<String, ExpiringCache<Timestamp, f64>>,
}

impl SampleStore {
    /// Create an empty store
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::InvalidConfig`](crate::SieveError::InvalidConfig)
    /// if any interval is zero.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            histories: HashMap::new(),
        })
    }

    /// Create a store from a configuration already known to be valid
    pub(crate) fn new_unchecked(config: StoreConfig) -> Self {
        Self {
            config,
            histories: HashMap::new(),
        }
    }

    /// Insert or overwrite the sample at `sample.timestamp` for `identity`
    pub fn register(&mut self, identity: &str, sample: Sample) {
        self.register_at(identity, sample, Instant::now());
    }

    /// Register as if the current time were `now`
    pub fn register_at(&mut self, identity: &str, sample: Sample, now: Instant) {
        let ttl = self.config.data_point_expiration_time;
        self.histories
            .entry(identity.to_string())
            .or_insert_with(|| {
                log::debug!("tracking new metric identity {:?}", identity);
                ExpiringCache::new(ttl)
            })
            .insert_at(sample.timestamp, sample.value, now);
    }

    /// Copy of the samples currently held for `identity`
    ///
    /// Expired samples are included until the next [`SampleStore::expire`].
    pub fn list(&self, identity: &str) -> History {
        self.histories
            .get(identity)
            .map(|history| {
                history
                    .items()
                    .map(|(timestamp, value)| (*timestamp, *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove every identity with no samples left, returning how many went
    pub fn cleanup(&mut self) -> usize {
        let before = self.histories.len();
        self.histories.retain(|_, history| !history.is_empty());
        let removed = before - self.histories.len();
        if removed > 0 {
            log::debug!("removed {} empty metric identities", removed);
        }
        removed
    }

    /// Drop samples past their expiration time, returning how many went
    pub fn expire(&mut self) -> usize {
        self.expire_at(Instant::now())
    }

    /// Expire as if the current time were `now`
    pub fn expire_at(&mut self, now: Instant) -> usize {
        let removed: usize = self
            .histories
            .values_mut()
            .map(|history| history.delete_expired_at(now))
            .sum();
        if removed > 0 {
            log::debug!("expired {} samples", removed);
        }
        removed
    }

    /// Check if `identity` has a history (possibly empty)
    pub fn contains(&self, identity: &str) -> bool {
        self.histories.contains_key(identity)
    }

    /// Number of identities tracked
    pub fn identity_count(&self) -> usize {
        self.histories.len()
    }

    /// Total samples held across all identities
    pub fn sample_count(&self) -> usize {
        self.histories.values().map(ExpiringCache::len).sum()
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.histories.clear();
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
