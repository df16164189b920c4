// Sieve Pipeline - Metric batch traversal
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-metric filtering
//!
//! A [`MetricFilter`] trims the data points of one metric in place and
//! reports whether the metric is left with nothing worth forwarding.

use crate::error::Result;
use crate::model::{Metric, MetricData};
use sieve::{Sieve, SieveConfig};

/// Filters the data points of a single metric
pub trait MetricFilter {
    /// Trim `metric` in place.
    ///
    /// Returns `true` when the metric should be removed from its batch.
    fn sift(&mut self, metric: &mut Metric) -> bool;
}

impl<F> MetricFilter for F
where
    F: FnMut(&mut Metric) -> bool,
{
    fn sift(&mut self, metric: &mut Metric) -> bool {
        self(metric)
    }
}

/// Runs every gauge data point through a sieve
///
/// The metric name is the sieve identity. Points are visited in arrival
/// order; integer values are widened to `f64`. Sums and histograms pass
/// through untouched.
#[derive(Debug)]
pub struct FrequencyFilter {
    sieve: Sieve,
}

impl FrequencyFilter {
    /// Create a filter with its own engine
    pub fn new(config: SieveConfig) -> Result<Self> {
        Ok(Self::from_sieve(Sieve::new(config)?))
    }

    /// Wrap an existing engine
    pub fn from_sieve(sieve: Sieve) -> Self {
        Self { sieve }
    }

    /// Access the engine
    pub fn sieve(&self) -> &Sieve {
        &self.sieve
    }

    /// Mutable access to the engine
    pub fn sieve_mut(&mut self) -> &mut Sieve {
        &mut self.sieve
    }

    /// Unwrap the engine
    pub fn into_inner(self) -> Sieve {
        self.sieve
    }
}

impl MetricFilter for FrequencyFilter {
    fn sift(&mut self, metric: &mut Metric) -> bool {
        let sieve = &mut self.sieve;
        sift_gauge(metric, |name, sample| sieve.sift(name, sample))
    }
}

fn sift_gauge(metric: &mut Metric, mut drop: impl FnMut(&str, sieve::Sample) -> bool) -> bool {
    let Metric { name, data, .. } = metric;
    match data {
        MetricData::Gauge { data_points } => {
            let before = data_points.len();
            data_points.retain(|point| !drop(name, point.to_sample()));
            log::trace!(
                "{}: kept {} of {} data points",
                name,
                data_points.len(),
                before
            );
            data_points.is_empty()
        }
        MetricData::Sum { .. } | MetricData::Histogram { .. } => false,
    }
}
