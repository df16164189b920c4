//! # Sieve Pipeline
//!
//! Applies the sieve to batches of metrics laid out as
//! resources, instrumentation scopes, metrics and data points.
//!
//! Gauge data points are run through the engine keyed by metric name.
//! Metrics left with no points are removed, and so are scopes and
//! resources left with no metrics. Other metric types pass through.
//!
//! ## Example
//!
//! ```rust
//! use sieve::{SieveConfig, Timestamp};
//! use sieve_pipeline::{FrequencyProcessor, Metric, MetricsBatch, NumberDataPoint};
//! use sieve_pipeline::{ResourceMetrics, ScopeMetrics};
//!
//! let mut processor = FrequencyProcessor::from_config(SieveConfig::default()).unwrap();
//!
//! let batch = MetricsBatch {
//!     resource_metrics: vec![ResourceMetrics {
//!         scope_metrics: vec![ScopeMetrics {
//!             metrics: vec![Metric::gauge(
//!                 "cpu.idle",
//!                 vec![NumberDataPoint::double(Timestamp::from_secs(0), 90.0)],
//!             )],
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//! };
//!
//! // First sample of a metric is always forwarded
//! let out = processor.process(batch);
//! assert_eq!(out.data_point_count(), 1);
//! ```

pub mod error;
pub mod filter;
pub mod model;
pub mod processor;

pub use error::{PipelineError, Result};
pub use filter::{FrequencyFilter, MetricFilter};
pub use model::{
    Attributes, HistogramDataPoint, Metric, MetricData, MetricsBatch, NumberDataPoint,
    NumberValue, ResourceMetrics, Scope, ScopeMetrics,
};
pub use processor::{FrequencyProcessor, ProcessorStats};
