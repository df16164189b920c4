// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Classification and rate-limiting engine
//!
//! [`Sieve`] decides, sample by sample, whether to forward or discard. It
//! owns the sample history and the table of last forwarded timestamps; no
//! other component reads or writes them.
//!
//! A `Sieve` is not synchronized. Calls for the same identity must be
//! serialized, either by keeping one engine per thread or by wrapping it in
//! a [`SharedSieve`](crate::housekeeping::SharedSieve).

use crate::classifier::{Classifier, Decision, Evaluation, Rule, Verdict};
use crate::config::SieveConfig;
use crate::error::Result;
use crate::metrics::SiftMetrics;
use crate::sample::{Sample, Timestamp};
use crate::store::SampleStore;
use std::collections::HashMap;
use std::time::Instant;

/// Stateful keep/drop filter over per-identity sample streams
#[derive(Debug, Clone)]
pub struct Sieve {
    classifier: Classifier,
    store: SampleStore,
    last_forwarded: HashMap<String, Timestamp>,
    metrics: SiftMetrics,
}

impl Sieve {
    /// Create an engine
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::InvalidConfig`](crate::SieveError::InvalidConfig)
    /// if any threshold or interval is out of range.
    pub fn new(config: SieveConfig) -> Result<Self> {
        config.validate()?;
        let store = SampleStore::new(config.store.clone())?;
        Ok(Self {
            classifier: Classifier::new(config),
            store,
            last_forwarded: HashMap::new(),
            metrics: SiftMetrics::new(),
        })
    }

    /// Create an engine with default thresholds
    pub fn with_defaults() -> Self {
        Self {
            classifier: Classifier::new(SieveConfig::default()),
            store: SampleStore::new_unchecked(SieveConfig::default().store),
            last_forwarded: HashMap::new(),
            metrics: SiftMetrics::new(),
        }
    }

    /// Decide whether `sample` should be discarded
    ///
    /// Returns `true` to drop, `false` to forward.
    pub fn sift(&mut self, identity: &str, sample: Sample) -> bool {
        self.classify(identity, sample).is_drop()
    }

    /// Decide and report which rule decided
    pub fn classify(&mut self, identity: &str, sample: Sample) -> Decision {
        self.classify_at(identity, sample, Instant::now())
    }

    /// Classify with `now` as the wall-clock time used for sample expiry
    pub fn classify_at(&mut self, identity: &str, sample: Sample, now: Instant) -> Decision {
        let decision = self.evaluate(identity, sample, now);

        if decision.verdict == Verdict::KeepAndUpdate {
            match self.last_forwarded.get_mut(identity) {
                Some(last) => *last = sample.timestamp,
                None => {
                    self.last_forwarded
                        .insert(identity.to_string(), sample.timestamp);
                }
            }
        }
        self.metrics.record(&decision);

        log::trace!(
            "{} @ {} = {}: {:?} by {}",
            identity,
            sample.timestamp,
            sample.value,
            decision.verdict,
            decision.rule
        );
        decision
    }

    fn evaluate(&mut self, identity: &str, sample: Sample, now: Instant) -> Decision {
        // NaN would poison every statistic; forward it and remember nothing
        if sample.is_nan() {
            return Decision::by(Rule::NanPassThrough);
        }

        let mut history = self.store.list(identity);
        self.store.register_at(identity, sample, now);
        history.insert(sample.timestamp, sample.value);

        let last_forwarded = match self.last_forwarded.get(identity) {
            Some(last) => *last,
            None => return Decision::by(Rule::Bootstrap),
        };

        self.classifier.classify(&Evaluation {
            sample,
            history: &history,
            last_forwarded,
        })
    }

    /// Timestamp of the last forwarded sample for `identity`
    pub fn last_forwarded(&self, identity: &str) -> Option<Timestamp> {
        self.last_forwarded.get(identity).copied()
    }

    /// Run the per-sample expiry sweep
    pub fn expire_samples(&mut self) -> usize {
        self.store.expire()
    }

    /// Run the per-sample expiry sweep as of `now`
    pub fn expire_samples_at(&mut self, now: Instant) -> usize {
        self.store.expire_at(now)
    }

    /// Drop identities left without samples
    pub fn cleanup_identities(&mut self) -> usize {
        self.store.cleanup()
    }

    /// Sample history
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Decision counters
    pub fn metrics(&self) -> &SiftMetrics {
        &self.metrics
    }

    /// Thresholds in use
    pub fn config(&self) -> &SieveConfig {
        self.classifier.config()
    }

    /// Number of identities ever forwarded
    pub fn identity_count(&self) -> usize {
        self.last_forwarded.len()
    }

    /// Forget all history, forwarding state and counters
    pub fn reset(&mut self) {
        self.store.clear();
        self.last_forwarded.clear();
        self.metrics.reset();
    }
}

impl Default for Sieve {
    fn default() -> Self {
        Self::with_defaults()
    }
}
