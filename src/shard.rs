// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Identity sharding
//!
//! Spreads identities over independent engines so unrelated metrics do not
//! contend on one lock. An identity always hashes to the same shard, so no
//! identity's state is ever split.

use crate::classifier::Decision;
use crate::config::SieveConfig;
use crate::error::{Result, SieveError};
use crate::housekeeping::{Housekeeper, SharedSieve};
use crate::sample::Sample;
use xxhash_rust::xxh64::xxh64;

/// Seed for identity hashing
const SHARD_SEED: u64 = 0;

/// Fixed set of engines addressed by identity hash
#[derive(Debug, Clone)]
pub struct ShardedSieve {
    shards: Vec<SharedSieve>,
}

impl ShardedSieve {
    /// Create `shards` engines sharing one configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `shards` is zero or the configuration is invalid.
    pub fn new(config: SieveConfig, shards: usize) -> Result<Self> {
        if shards == 0 {
            return Err(SieveError::invalid_config("shard count must be positive"));
        }
        let shards = (0..shards)
            .map(|_| SharedSieve::new(config.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { shards })
    }

    /// Index of the shard owning `identity`
    pub fn shard_index(&self, identity: &str) -> usize {
        (xxh64(identity.as_bytes(), SHARD_SEED) % self.shards.len() as u64) as usize
    }

    /// Engine owning `identity`
    pub fn shard_for(&self, identity: &str) -> &SharedSieve {
        &self.shards[self.shard_index(identity)]
    }

    /// Decide whether `sample` should be discarded (true = drop)
    pub fn sift(&self, identity: &str, sample: Sample) -> bool {
        self.shard_for(identity).sift(identity, sample)
    }

    /// Decide and report which rule decided
    pub fn classify(&self, identity: &str, sample: Sample) -> Decision {
        self.shard_for(identity).classify(identity, sample)
    }

    /// All shards
    pub fn shards(&self) -> &[SharedSieve] {
        &self.shards
    }

    /// Number of shards
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Whether there are no shards
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Start one housekeeper per shard
    pub fn spawn_housekeepers(&self) -> Result<Vec<Housekeeper>> {
        self.shards
            .iter()
            .map(SharedSieve::spawn_housekeeper)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_shards_rejected() {
        assert!(matches!(
            ShardedSieve::new(SieveConfig::default(), 0),
            Err(SieveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_routing_is_stable() {
        let sharded = ShardedSieve::new(SieveConfig::default(), 8).unwrap();
        let first = sharded.shard_index("cpu.idle");
        for _ in 0..10 {
            assert_eq!(sharded.shard_index("cpu.idle"), first);
        }
        assert!(first < 8);
    }

    #[test]
    fn test_identity_lives_in_one_shard() {
        let sharded = ShardedSieve::new(SieveConfig::default(), 4).unwrap();
        sharded.sift("mem.used", Sample::at_secs(0, 1.0));
        sharded.sift("mem.used", Sample::at_secs(60, 1.0));

        let owners: Vec<usize> = sharded
            .shards()
            .iter()
            .map(|shard| shard.with(|sieve| sieve.store().list("mem.used").len()))
            .collect();
        assert_eq!(owners.iter().filter(|n| **n > 0).count(), 1);
        assert_eq!(owners.iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_spawn_housekeepers() {
        let sharded = ShardedSieve::new(SieveConfig::default(), 3).unwrap();
        let housekeepers = sharded.spawn_housekeepers().unwrap();
        assert_eq!(housekeepers.len(), 3);
    }
}
