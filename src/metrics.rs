//! Decision counters for sieve analysis
//!
//! This module tracks how many samples each rule kept or dropped.
//! Counters never influence decisions.

use crate::classifier::{Decision, Rule};
use std::collections::HashMap;

/// Sifting statistics collector
#[derive(Debug, Clone, Default)]
pub struct SiftMetrics {
    /// Samples forwarded
    pub kept: u64,
    /// Samples discarded
    pub dropped: u64,
    /// Decisions per rule
    pub rule_distribution: HashMap<Rule, u64>,
}

impl SiftMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one decision
    pub fn record(&mut self, decision: &Decision) {
        if decision.is_drop() {
            self.dropped += 1;
        } else {
            self.kept += 1;
        }
        *self.rule_distribution.entry(decision.rule).or_insert(0) += 1;
    }

    /// Samples evaluated
    pub fn total(&self) -> u64 {
        self.kept + self.dropped
    }

    /// Fraction of samples dropped (0.0 - 1.0)
    pub fn drop_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.dropped as f64 / total as f64
    }

    /// Decisions taken by `rule`
    pub fn count(&self, rule: Rule) -> u64 {
        self.rule_distribution.get(&rule).copied().unwrap_or(0)
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Sieve Metrics ===\n\n");
        report.push_str(&format!("Samples evaluated: {}\n", self.total()));
        report.push_str(&format!("Kept: {}\n", self.kept));
        report.push_str(&format!("Dropped: {}\n", self.dropped));
        report.push_str(&format!(
            "Drop ratio: {:.1}%\n\n",
            self.drop_ratio() * 100.0
        ));

        report.push_str("Rule distribution:\n");
        for rule in Rule::ALL {
            let count = self.count(rule);
            if count == 0 {
                continue;
            }
            let percent = (count as f64 / self.total() as f64) * 100.0;
            report.push_str(&format!("  {}: {} ({:.1}%)\n", rule, count, percent));
        }

        report
    }
}
