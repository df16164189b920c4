// Sieve - Metric volume reduction
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Shared engine and background housekeeping
//!
//! [`SharedSieve`] serializes every call behind one lock, so concurrent
//! batches can share an engine. [`Housekeeper`] runs the two store sweeps on
//! their own intervals from a background thread, taking the same lock only
//! for the duration of a sweep.

use crate::classifier::Decision;
use crate::config::{require_positive, SieveConfig};
use crate::engine::Sieve;
use crate::error::Result;
use crate::sample::Sample;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Thread-safe handle to one [`Sieve`]
#[derive(Debug, Clone)]
pub struct SharedSieve {
    inner: Arc<Mutex<Sieve>>,
}

impl SharedSieve {
    /// Create a shared engine
    pub fn new(config: SieveConfig) -> Result<Self> {
        Ok(Self::from_sieve(Sieve::new(config)?))
    }

    /// Wrap an existing engine
    pub fn from_sieve(sieve: Sieve) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sieve)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sieve> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("sieve lock poisoned, recovering state");
            poisoned.into_inner()
        })
    }

    /// Decide whether `sample` should be discarded (true = drop)
    pub fn sift(&self, identity: &str, sample: Sample) -> bool {
        self.lock().sift(identity, sample)
    }

    /// Decide and report which rule decided
    pub fn classify(&self, identity: &str, sample: Sample) -> Decision {
        self.lock().classify(identity, sample)
    }

    /// Run `f` with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut Sieve) -> R) -> R {
        f(&mut self.lock())
    }

    /// Run the per-sample expiry sweep
    pub fn expire_samples(&self) -> usize {
        self.lock().expire_samples()
    }

    /// Drop identities left without samples
    pub fn cleanup_identities(&self) -> usize {
        self.lock().cleanup_identities()
    }

    /// Start sweeping on the configured store intervals
    pub fn spawn_housekeeper(&self) -> Result<Housekeeper> {
        let store = self.lock().config().store.clone();
        self.spawn_housekeeper_with(
            store.data_point_cache_cleanup_interval,
            store.metric_cache_cleanup_interval,
        )
    }

    /// Start sweeping on explicit intervals
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::InvalidConfig`](crate::SieveError::InvalidConfig)
    /// if either interval is zero.
    pub fn spawn_housekeeper_with(
        &self,
        expire_every: Duration,
        cleanup_every: Duration,
    ) -> Result<Housekeeper> {
        require_positive("expire interval", expire_every)?;
        require_positive("cleanup interval", cleanup_every)?;

        let (stop_tx, stop_rx) = mpsc::channel();
        let sieve = self.clone();

        let handle = thread::Builder::new()
            .name("sieve-housekeeper".to_string())
            .spawn(move || {
                let mut next_expire = deadline(Instant::now(), expire_every);
                let mut next_cleanup = deadline(Instant::now(), cleanup_every);

                loop {
                    let wake = next_expire.min(next_cleanup);
                    match stop_rx.recv_timeout(wake.saturating_duration_since(Instant::now())) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let now = Instant::now();
                    if now >= next_expire {
                        sieve.expire_samples();
                        next_expire = deadline(now, expire_every);
                    }
                    if now >= next_cleanup {
                        sieve.cleanup_identities();
                        next_cleanup = deadline(now, cleanup_every);
                    }
                }
                log::info!("sieve housekeeper stopped");
            })?;

        log::info!(
            "sieve housekeeper started (expire every {:?}, cleanup every {:?})",
            expire_every,
            cleanup_every
        );
        Ok(Housekeeper {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

fn deadline(now: Instant, every: Duration) -> Instant {
    now.checked_add(every)
        .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 60 * 60))
}

/// Handle to the background sweep thread
///
/// Dropping the handle stops the thread and waits for it.
#[derive(Debug)]
pub struct Housekeeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Housekeeper {
    /// Stop sweeping and wait for the thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Check if the thread is still running
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("sieve housekeeper panicked");
            }
        }
    }
}

impl Drop for Housekeeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}
