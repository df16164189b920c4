// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Windowed statistics used to classify a metric.
//!
//! A metric is "low information" when it has no big changes (no value
//! outside the IQR band) and little oscillation (variation below a multiple
//! of the IQR).

use crate::store::History;

/// Absolute tolerance for treating two values as equal
pub const FLOAT_EQUALITY_THRESHOLD: f64 = 1e-9;

/// Compare with an absolute epsilon, not a relative one
pub fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_EQUALITY_THRESHOLD
}

/// Whether every value in `history` is within epsilon of `value`
pub fn is_constant(value: f64, history: &History) -> bool {
    history.values().all(|v| almost_equal(value, *v))
}

/// First and third quartiles by nearest rank
///
/// Values are sorted ascending and read at indices `n/4` and `3n/4`.
/// Returns `None` for an empty slice.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    Some((sorted[n / 4], sorted[3 * n / 4]))
}

/// Sum of absolute differences between time-adjacent values
pub fn variation(history: &History) -> f64 {
    history
        .values()
        .zip(history.values().skip(1))
        .map(|(previous, current)| (current - previous).abs())
        .sum()
}

/// Whether every value lies in `[lower, upper]`
pub fn within_bounds(history: &History, lower: f64, upper: f64) -> bool {
    history.values().all(|v| *v >= lower && *v <= upper)
}

/// Spread figures computed for one low-information check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub variation: f64,
}

impl Spread {
    /// Compute quartiles and variation; `None` for an empty history
    pub fn of(history: &History) -> Option<Self> {
        let values: Vec<f64> = history.values().copied().collect();
        let (q1, q3) = quartiles(&values)?;
        Some(Self {
            q1,
            q3,
            iqr: q3 - q1,
            variation: variation(history),
        })
    }
}

/// Whether the history shows neither IQR outliers nor real oscillation
pub fn is_low_information(
    history: &History,
    iqr_anomaly_coefficient: f64,
    variation_iqr_threshold_coefficient: f64,
) -> bool {
    let spread = match Spread::of(history) {
        Some(spread) => spread,
        None => return false,
    };
    let lower = spread.q1 - iqr_anomaly_coefficient * spread.iqr;
    let upper = spread.q3 + iqr_anomaly_coefficient * spread.iqr;

    within_bounds(history, lower, upper)
        && spread.variation < variation_iqr_threshold_coefficient * spread.iqr
}
