// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sample and timestamp types
//!
//! Timestamps are nanoseconds since the Unix epoch, the resolution used by
//! OpenTelemetry data points. Adding a [`Duration`] saturates instead of
//! wrapping, so frequency gates near `u64::MAX` stay monotonic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// Point in time with nanosecond resolution
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from nanoseconds since the epoch
    pub const fn from_nanos(nanos: u64) -> Self {
        Timestamp(nanos)
    }

    /// Create a timestamp from milliseconds since the epoch
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// Create a timestamp from seconds since the epoch
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// Nanoseconds since the epoch
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Add a duration, clamping at the largest representable instant
    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(nanos))
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        self.saturating_add(rhs)
    }
}

impl From<u64> for Timestamp {
    fn from(nanos: u64) -> Self {
        Timestamp(nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / NANOS_PER_SEC;
        let nanos = self.0 % NANOS_PER_SEC;
        write!(f, "{}.{:09}", secs, nanos)
    }
}

#[cfg(feature = "timestamps")]
impl From<chrono::DateTime<chrono::Utc>> for Timestamp {
    fn from(time: chrono::DateTime<chrono::Utc>) -> Self {
        // Instants before the epoch clamp to zero
        let nanos = time.timestamp_nanos_opt().unwrap_or(0).max(0);
        Timestamp(nanos as u64)
    }
}

/// One scalar observation of a metric identity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the value was observed
    pub timestamp: Timestamp,
    /// The observed value (NaN is legal and never filtered)
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Create a sample at `secs` seconds since the epoch
    pub fn at_secs(secs: u64, value: f64) -> Self {
        Self::new(Timestamp::from_secs(secs), value)
    }

    /// Whether the value is NaN
    pub fn is_nan(&self) -> bool {
        self.value.is_nan()
    }
}
