// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sieve configuration.
//!
//! Durations are (de)serialized as integer milliseconds.

use crate::error::{Result, SieveError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Thresholds for the classification and rate-limiting engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    /// Warm-up window before any suppression begins.
    #[serde(with = "duration_ms")]
    pub min_point_accumulation_time: Duration,

    /// Minimum forwarding cadence for metrics judged constant.
    #[serde(with = "duration_ms")]
    pub constant_metrics_report_frequency: Duration,

    /// Minimum forwarding cadence for metrics judged low-information.
    #[serde(with = "duration_ms")]
    pub low_info_metrics_report_frequency: Duration,

    /// Minimum forwarding cadence for all other metrics.
    #[serde(with = "duration_ms")]
    pub max_report_frequency: Duration,

    /// Multiplier on the IQR defining the outlier-free band.
    pub iqr_anomaly_coefficient: f64,

    /// Multiplier on the IQR defining "low oscillation".
    pub variation_iqr_threshold_coefficient: f64,

    /// Sample history settings.
    pub store: StoreConfig,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            min_point_accumulation_time: Duration::from_secs(15 * 60),
            constant_metrics_report_frequency: Duration::from_secs(5 * 60),
            low_info_metrics_report_frequency: Duration::from_secs(2 * 60),
            max_report_frequency: Duration::from_secs(30),
            iqr_anomaly_coefficient: 1.5,
            variation_iqr_threshold_coefficient: 4.0,
            store: StoreConfig::default(),
        }
    }
}

impl SieveConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SieveConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every threshold. Called by the engine before it is built.
    pub fn validate(&self) -> Result<()> {
        require_positive(
            "constant_metrics_report_frequency",
            self.constant_metrics_report_frequency,
        )?;
        require_positive(
            "low_info_metrics_report_frequency",
            self.low_info_metrics_report_frequency,
        )?;
        require_positive("max_report_frequency", self.max_report_frequency)?;

        if !self.iqr_anomaly_coefficient.is_finite() || self.iqr_anomaly_coefficient < 0.0 {
            return Err(SieveError::invalid_config(format!(
                "iqr_anomaly_coefficient must be a finite non-negative number, got {}",
                self.iqr_anomaly_coefficient
            )));
        }
        if !self.variation_iqr_threshold_coefficient.is_finite()
            || self.variation_iqr_threshold_coefficient <= 0.0
        {
            return Err(SieveError::invalid_config(format!(
                "variation_iqr_threshold_coefficient must be a finite positive number, got {}",
                self.variation_iqr_threshold_coefficient
            )));
        }

        self.store.validate()
    }
}

/// Expiry settings for the sample history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Per-sample time-to-live within a metric's history.
    #[serde(with = "duration_ms")]
    pub data_point_expiration_time: Duration,

    /// Sweep period for expiring individual samples.
    #[serde(with = "duration_ms")]
    pub data_point_cache_cleanup_interval: Duration,

    /// Sweep period for removing metric identities with no samples left.
    #[serde(with = "duration_ms")]
    pub metric_cache_cleanup_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_point_expiration_time: Duration::from_secs(60 * 60),
            data_point_cache_cleanup_interval: Duration::from_secs(10 * 60),
            metric_cache_cleanup_interval: Duration::from_secs(3 * 60 * 60),
        }
    }
}

impl StoreConfig {
    /// Check that every interval is positive.
    pub fn validate(&self) -> Result<()> {
        require_positive("data_point_expiration_time", self.data_point_expiration_time)?;
        require_positive(
            "data_point_cache_cleanup_interval",
            self.data_point_cache_cleanup_interval,
        )?;
        require_positive(
            "metric_cache_cleanup_interval",
            self.metric_cache_cleanup_interval,
        )
    }
}

pub(crate) fn require_positive(name: &str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(SieveError::invalid_config(format!(
            "{} must be positive",
            name
        )));
    }
    Ok(())
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
