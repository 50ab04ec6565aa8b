//! # Per-device observation history with noise filtering.
//!
//! [`ObservationStore`] keeps an ordered history of discovery samples per
//! device, newest first, and decides which samples are worth keeping.
//!
//! ## Filtering rule
//! A new sample is compared **only** against the most recent retained sample
//! for the same device:
//! ```text
//! accept ⇔ |new.rssi − last.rssi| > signal_delta
//!        ∨ new.at − last.at      > sample_interval
//! ```
//! Everything else is treated as noise and discarded. The first sample for a
//! device is always accepted.
//!
//! ## Growth policy
//! History is unbounded by default (matching the behavior this crate was
//! modeled on). Two explicit policy surfaces exist instead of a silent cap:
//! - `max_per_device` truncates each device's history when non-zero;
//! - [`ObservationStore::purge`] clears everything, exposed to callers as
//!   the `PurgeObservations` command.

use std::collections::HashMap;
use std::time::Duration;

use crate::core::Config;

use super::observation::{DeviceId, Observation, ObservationsSnapshot};

/// Ordered per-device discovery history with a noise filter.
pub struct ObservationStore {
    history: HashMap<DeviceId, Vec<Observation>>,
    signal_delta: f64,
    sample_interval: Duration,
    max_per_device: usize,
}

impl ObservationStore {
    /// Creates an empty store with thresholds taken from `cfg`.
    pub fn new(cfg: &Config) -> Self {
        Self {
            history: HashMap::new(),
            signal_delta: cfg.signal_delta,
            sample_interval: cfg.sample_interval,
            max_per_device: cfg.max_history_per_device,
        }
    }

    /// Records one sample. Returns `true` when the sample was retained.
    ///
    /// The decision is a pure function of the new sample and the most recent
    /// retained sample for that device; older history is never consulted.
    pub fn record(&mut self, obs: Observation) -> bool {
        let device = obs.device().clone();
        match self.history.get_mut(&device) {
            None => {
                self.history.insert(device, vec![obs]);
                true
            }
            Some(samples) => {
                // First entry is the newest retained sample.
                let last = match samples.first() {
                    Some(last) => last,
                    None => {
                        samples.push(obs);
                        return true;
                    }
                };
                let delta = (obs.rssi - last.rssi).abs();
                let elapsed = obs.at.saturating_duration_since(last.at);
                if delta > self.signal_delta || elapsed > self.sample_interval {
                    samples.insert(0, obs);
                    if self.max_per_device > 0 {
                        samples.truncate(self.max_per_device);
                    }
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Builds a full snapshot of the current history for broadcasting.
    pub fn snapshot(&self) -> ObservationsSnapshot {
        ObservationsSnapshot::new(self.history.clone())
    }

    /// Drops all retained history for all devices.
    pub fn purge(&mut self) {
        self.history.clear();
    }

    /// Number of devices with at least one retained sample.
    pub fn device_count(&self) -> usize {
        self.history.len()
    }

    /// Retained history for one device, newest first.
    pub fn history(&self, device: &DeviceId) -> Option<&[Observation]> {
        self.history.get(device).map(Vec::as_slice)
    }
}
