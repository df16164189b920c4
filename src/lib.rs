//! # Sieve - Metric volume reduction
//!
//! A stateful filter that inspects a stream of numeric samples per metric
//! identity and decides, sample by sample, whether to forward or discard it.
//!
//! ## Key Features
//!
//! - **Constant detection**: metrics that never change are forwarded only as a heartbeat
//! - **Low-information detection**: no IQR outliers and low variation
//! - **Bounded suppression**: every category has a minimum forwarding frequency
//! - **Expiring history**: per-identity samples age out, empty identities are swept
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::{Sample, Sieve, SieveConfig};
//! use std::time::Duration;
//!
//! let config = SieveConfig {
//!     min_point_accumulation_time: Duration::ZERO,
//!     constant_metrics_report_frequency: Duration::from_secs(30),
//!     ..Default::default()
//! };
//! let mut sieve = Sieve::new(config).unwrap();
//!
//! // The first sample of a metric is always forwarded
//! assert!(!sieve.sift("cpu.idle", Sample::at_secs(0, 90.0)));
//!
//! // A repeated value inside the heartbeat window is dropped
//! assert!(sieve.sift("cpu.idle", Sample::at_secs(10, 90.0)));
//!
//! // NaN is always forwarded
//! assert!(!sieve.sift("cpu.idle", Sample::at_secs(20, f64::NAN)));
//! ```
//!
//! ## Modules
//!
//! - [`sample`]: Timestamps and samples
//! - [`cache`]: Insert-with-TTL map
//! - [`store`]: Per-identity sample history
//! - [`stats`]: Quartiles, variation and category checks
//! - [`classifier`]: Ordered decision rules
//! - [`engine`]: The keep/drop engine
//! - [`housekeeping`]: Shared engine and background sweeps
//! - [`shard`]: Identity sharding across engines
//! - [`metrics`]: Decision counters

// Modules
pub mod cache;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod housekeeping;
pub mod metrics;
pub mod sample;
pub mod shard;
pub mod stats;
pub mod store;

// Re-exports for convenient access
pub use cache::ExpiringCache;
pub use classifier::{Classifier, Decision, Rule, Verdict, SAFETY_INTERVAL};
pub use config::{SieveConfig, StoreConfig};
pub use engine::Sieve;
pub use error::{Result, SieveError};
pub use housekeeping::{Housekeeper, SharedSieve};
pub use metrics::SiftMetrics;
pub use sample::{Sample, Timestamp};
pub use shard::ShardedSieve;
pub use stats::FLOAT_EQUALITY_THRESHOLD;
pub use store::{History, SampleStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
