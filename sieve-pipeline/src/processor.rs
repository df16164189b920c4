// Sieve Pipeline - Metric batch traversal
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Batch processor
//!
//! Walks resources, scopes and metrics, hands every metric to a
//! [`MetricFilter`], and removes whatever the filter leaves empty.

use crate::error::Result;
use crate::filter::{FrequencyFilter, MetricFilter};
use crate::model::MetricsBatch;
use sieve::SieveConfig;

/// Running totals over processed batches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Batches processed
    pub batches: u64,
    /// Metrics received
    pub metrics_in: u64,
    /// Metrics removed entirely
    pub metrics_removed: u64,
    /// Data points received
    pub points_in: u64,
    /// Data points forwarded
    pub points_out: u64,
}

impl ProcessorStats {
    /// Fraction of data points removed
    pub fn point_reduction(&self) -> f64 {
        if self.points_in == 0 {
            0.0
        } else {
            1.0 - self.points_out as f64 / self.points_in as f64
        }
    }
}

/// Applies a metric filter to whole batches
#[derive(Debug)]
pub struct FrequencyProcessor<F> {
    filter: F,
    stats: ProcessorStats,
}

impl FrequencyProcessor<FrequencyFilter> {
    /// Create a processor backed by a fresh sieve
    pub fn from_config(config: SieveConfig) -> Result<Self> {
        Ok(Self::new(FrequencyFilter::new(config)?))
    }
}

impl<F: MetricFilter> FrequencyProcessor<F> {
    /// Create a processor around a filter
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            stats: ProcessorStats::default(),
        }
    }

    /// Filter a batch.
    ///
    /// Metrics the filter empties are removed, then scopes without metrics,
    /// then resources without scopes. Order of everything kept is preserved.
    pub fn process(&mut self, mut batch: MetricsBatch) -> MetricsBatch {
        let metrics_in = batch.metric_count() as u64;
        let points_in = batch.data_point_count() as u64;
        let filter = &mut self.filter;
        let mut removed = 0u64;

        batch.resource_metrics.retain_mut(|resource| {
            resource.scope_metrics.retain_mut(|scope| {
                scope.metrics.retain_mut(|metric| {
                    let remove = filter.sift(metric);
                    if remove {
                        removed += 1;
                    }
                    !remove
                });
                !scope.metrics.is_empty()
            });
            !resource.scope_metrics.is_empty()
        });

        let points_out = batch.data_point_count() as u64;
        self.stats.batches += 1;
        self.stats.metrics_in += metrics_in;
        self.stats.metrics_removed += removed;
        self.stats.points_in += points_in;
        self.stats.points_out += points_out;

        log::debug!(
            "Processed batch: {}/{} metrics removed, {}/{} points forwarded",
            removed,
            metrics_in,
            points_out,
            points_in
        );

        batch
    }

    /// Totals since creation or the last reset
    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    /// Reset totals
    pub fn reset_stats(&mut self) {
        self.stats = ProcessorStats::default();
    }

    /// Access the filter
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Mutable access to the filter
    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        let mut processor = FrequencyProcessor::new(|_: &mut crate::model::Metric| true);
        let out = processor.process(MetricsBatch::new());

        assert!(out.is_empty());
        assert_eq!(processor.stats().batches, 1);
        assert_eq!(processor.stats().point_reduction(), 0.0);
    }

    #[test]
    fn test_reset_stats() {
        let mut processor = FrequencyProcessor::from_config(SieveConfig::default()).unwrap();
        processor.process(MetricsBatch::new());
        processor.reset_stats();
        assert_eq!(processor.stats(), &ProcessorStats::default());
    }
}
