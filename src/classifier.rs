// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sample classification
//!
//! Three categories of metrics are recognised, each with its own minimum
//! forwarding frequency:
//! 1) constant metrics
//! 2) low-information metrics (no IQR anomaly and low variation)
//! 3) everything else
//!
//! The decision is an ordered chain of [`Rule`]s; the first one that matches
//! decides. NaN and first-observation handling need the engine's state and
//! are applied by [`Sieve`](crate::engine::Sieve) before the chain runs.

use crate::config::SieveConfig;
use crate::sample::{Sample, Timestamp};
use crate::stats;
use crate::store::History;
use std::fmt;
use std::time::Duration;

/// Margin added to the candidate timestamp in every frequency gate
pub const SAFETY_INTERVAL: Duration = Duration::from_secs(1);

/// What to do with a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Forward and record it as the last forwarded sample
    KeepAndUpdate,
    /// Forward without touching the last forwarded timestamp
    Keep,
    /// Discard
    Drop,
}

impl Verdict {
    /// Whether the sample is discarded
    pub fn is_drop(self) -> bool {
        matches!(self, Verdict::Drop)
    }
}

/// Rule that decided a sample, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    /// Value is NaN
    NanPassThrough,
    /// First sample ever seen for the identity
    Bootstrap,
    /// Not enough history accumulated yet
    Accumulating,
    /// Constant-metric report frequency elapsed
    ConstantHeartbeat,
    /// Every retained value equals this one
    Constant,
    /// Low-information report frequency elapsed
    LowInfoHeartbeat,
    /// No IQR anomaly and low variation
    LowInformation,
    /// Default report frequency elapsed
    MaxFrequency,
    /// Nothing forced a report
    Fallback,
}

impl Rule {
    /// Every rule, in evaluation order
    pub const ALL: [Rule; 9] = [
        Rule::NanPassThrough,
        Rule::Bootstrap,
        Rule::Accumulating,
        Rule::ConstantHeartbeat,
        Rule::Constant,
        Rule::LowInfoHeartbeat,
        Rule::LowInformation,
        Rule::MaxFrequency,
        Rule::Fallback,
    ];

    /// Rules evaluated against the windowed history
    pub const CHAIN: [Rule; 7] = [
        Rule::Accumulating,
        Rule::ConstantHeartbeat,
        Rule::Constant,
        Rule::LowInfoHeartbeat,
        Rule::LowInformation,
        Rule::MaxFrequency,
        Rule::Fallback,
    ];

    /// Outcome when this rule matches
    pub fn verdict(self) -> Verdict {
        match self {
            Rule::NanPassThrough => Verdict::Keep,
            Rule::Constant | Rule::LowInformation | Rule::Fallback => Verdict::Drop,
            Rule::Bootstrap
            | Rule::Accumulating
            | Rule::ConstantHeartbeat
            | Rule::LowInfoHeartbeat
            | Rule::MaxFrequency => Verdict::KeepAndUpdate,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::NanPassThrough => "nan_pass_through",
            Rule::Bootstrap => "bootstrap",
            Rule::Accumulating => "accumulating",
            Rule::ConstantHeartbeat => "constant_heartbeat",
            Rule::Constant => "constant",
            Rule::LowInfoHeartbeat => "low_info_heartbeat",
            Rule::LowInformation => "low_information",
            Rule::MaxFrequency => "max_frequency",
            Rule::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Outcome of classifying one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// What to do with the sample
    pub verdict: Verdict,
    /// Which rule decided
    pub rule: Rule,
}

impl Decision {
    /// Decision taken by `rule`
    pub fn by(rule: Rule) -> Self {
        Self {
            verdict: rule.verdict(),
            rule,
        }
    }

    /// Whether the sample is discarded
    pub fn is_drop(&self) -> bool {
        self.verdict.is_drop()
    }
}

/// Inputs of one pass through the rule chain
#[derive(Debug, Clone, Copy)]
pub struct Evaluation<'a> {
    /// Sample under evaluation
    pub sample: Sample,
    /// Windowed history, including `sample`
    pub history: &'a History,
    /// Timestamp of the last forwarded sample
    pub last_forwarded: Timestamp,
}

impl<'a> Evaluation<'a> {
    /// Earliest timestamp in the history (the sample's own if it is empty)
    pub fn earliest(&self) -> Timestamp {
        self.history
            .keys()
            .next()
            .copied()
            .unwrap_or(self.sample.timestamp)
    }
}

/// Whether `frequency` has elapsed since `last_forwarded`, with the safety margin
pub fn past_frequency(timestamp: Timestamp, last_forwarded: Timestamp, frequency: Duration) -> bool {
    timestamp + SAFETY_INTERVAL > last_forwarded + frequency
}

/// Evaluates the rule chain against configured thresholds
#[derive(Debug, Clone)]
pub struct Classifier {
    config: SieveConfig,
}

impl Classifier {
    /// Create a classifier; thresholds are assumed validated
    pub fn new(config: SieveConfig) -> Self {
        Self { config }
    }

    /// Run the chain, returning the first matching rule
    pub fn classify(&self, eval: &Evaluation<'_>) -> Decision {
        Rule::CHAIN
            .iter()
            .copied()
            .find(|rule| self.matches(*rule, eval))
            .map(Decision::by)
            .unwrap_or_else(|| Decision::by(Rule::Fallback))
    }

    /// Whether a single chain rule matches
    ///
    /// Rules that need engine state (NaN, bootstrap) never match here.
    pub fn matches(&self, rule: Rule, eval: &Evaluation<'_>) -> bool {
        let timestamp = eval.sample.timestamp;
        match rule {
            Rule::NanPassThrough | Rule::Bootstrap => false,
            Rule::Accumulating => {
                timestamp < eval.earliest() + self.config.min_point_accumulation_time
            }
            Rule::ConstantHeartbeat => past_frequency(
                timestamp,
                eval.last_forwarded,
                self.config.constant_metrics_report_frequency,
            ),
            Rule::Constant => stats::is_constant(eval.sample.value, eval.history),
            Rule::LowInfoHeartbeat => past_frequency(
                timestamp,
                eval.last_forwarded,
                self.config.low_info_metrics_report_frequency,
            ),
            Rule::LowInformation => stats::is_low_information(
                eval.history,
                self.config.iqr_anomaly_coefficient,
                self.config.variation_iqr_threshold_coefficient,
            ),
            Rule::MaxFrequency => past_frequency(
                timestamp,
                eval.last_forwarded,
                self.config.max_report_frequency,
            ),
            Rule::Fallback => true,
        }
    }

    /// Thresholds in use
    pub fn config(&self) -> &SieveConfig {
        &self.config
    }
}
