// Sieve Pipeline - Metric batch traversal
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Metric batch model
//!
//! A batch nests resources, instrumentation scopes, metrics and data
//! points, following the OpenTelemetry metrics layout.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sieve::Timestamp;
use std::collections::BTreeMap;
use std::path::Path;

/// Key/value attributes of a resource or data point
pub type Attributes = BTreeMap<String, String>;

/// A batch of metrics as delivered by the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBatch {
    pub resource_metrics: Vec<ResourceMetrics>,
}

impl MetricsBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a batch from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON batch file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Render as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of resources
    pub fn resource_count(&self) -> usize {
        self.resource_metrics.len()
    }

    /// Number of metrics across all resources and scopes
    pub fn metric_count(&self) -> usize {
        self.metrics().count()
    }

    /// Number of data points across all metrics
    pub fn data_point_count(&self) -> usize {
        self.metrics().map(Metric::data_point_count).sum()
    }

    /// Check if the batch holds no resources
    pub fn is_empty(&self) -> bool {
        self.resource_metrics.is_empty()
    }

    /// Iterate over every metric
    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.resource_metrics
            .iter()
            .flat_map(|rm| rm.scope_metrics.iter())
            .flat_map(|sm| sm.metrics.iter())
    }
}

/// Metrics produced by one resource (host, container, service...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    #[serde(default)]
    pub resource: Attributes,
    pub scope_metrics: Vec<ScopeMetrics>,
}

/// Instrumentation scope that produced a group of metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Metrics of one instrumentation scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeMetrics {
    pub scope: Scope,
    pub metrics: Vec<Metric>,
}

/// A named metric and its data points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    pub data: MetricData,
}

impl Metric {
    /// Create a gauge metric
    pub fn gauge(name: impl Into<String>, data_points: Vec<NumberDataPoint>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            data: MetricData::Gauge { data_points },
        }
    }

    /// Create a sum metric
    pub fn sum(name: impl Into<String>, data_points: Vec<NumberDataPoint>, monotonic: bool) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            data: MetricData::Sum {
                data_points,
                monotonic,
            },
        }
    }

    /// Number of data points
    pub fn data_point_count(&self) -> usize {
        match &self.data {
            MetricData::Gauge { data_points } | MetricData::Sum { data_points, .. } => {
                data_points.len()
            }
            MetricData::Histogram { data_points } => data_points.len(),
        }
    }
}

/// Metric payload by type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricData {
    /// Sampled scalar value
    Gauge { data_points: Vec<NumberDataPoint> },
    /// Accumulated scalar value
    Sum {
        data_points: Vec<NumberDataPoint>,
        #[serde(default)]
        monotonic: bool,
    },
    /// Bucketed distribution
    Histogram { data_points: Vec<HistogramDataPoint> },
}

/// Scalar value as reported
///
/// Non-finite doubles are written as the strings `"NaN"`, `"Infinity"` and
/// `"-Infinity"`, since JSON numbers cannot carry them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberValue {
    Double(#[serde(with = "float_repr")] f64),
    Int(i64),
}

impl NumberValue {
    /// Value widened to `f64`
    pub fn as_f64(self) -> f64 {
        match self {
            NumberValue::Double(value) => value,
            NumberValue::Int(value) => value as f64,
        }
    }
}

/// One scalar observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberDataPoint {
    pub timestamp: Timestamp,
    pub value: NumberValue,
    #[serde(default)]
    pub attributes: Attributes,
}

impl NumberDataPoint {
    /// Data point with a floating-point value
    pub fn double(timestamp: Timestamp, value: f64) -> Self {
        Self {
            timestamp,
            value: NumberValue::Double(value),
            attributes: Attributes::new(),
        }
    }

    /// Data point with an integer value
    pub fn int(timestamp: Timestamp, value: i64) -> Self {
        Self {
            timestamp,
            value: NumberValue::Int(value),
            attributes: Attributes::new(),
        }
    }

    /// The point as a sieve sample
    pub fn to_sample(&self) -> sieve::Sample {
        sieve::Sample::new(self.timestamp, self.value.as_f64())
    }
}

/// One histogram observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramDataPoint {
    pub timestamp: Timestamp,
    pub count: u64,
    #[serde(with = "float_repr")]
    pub sum: f64,
    #[serde(default)]
    pub bucket_counts: Vec<u64>,
    #[serde(default)]
    pub explicit_bounds: Vec<f64>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Serde adapter for `f64` that keeps NaN and infinities representable in JSON
mod float_repr {
    use serde::de::{self, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_infinite() {
            let text = if value.is_sign_positive() {
                INFINITY
            } else {
                NEG_INFINITY
            };
            serializer.serialize_str(text)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => match text.as_str() {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a number, \"NaN\", \"Infinity\" or \"-Infinity\"",
                )),
            },
        }
    }
}
