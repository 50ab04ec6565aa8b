//! # Scanner configuration.
//!
//! [`Config`] centralizes every tunable of the scanner actor. There is no
//! CLI surface; callers construct a `Config` (usually `Default`) and pass
//! it to [`CentralScanner::spawn`](crate::CentralScanner::spawn).
//!
//! ## Sentinel values
//! - `max_history_per_device = 0` → unbounded history (no cap)
//! - `mailbox_capacity` is clamped to a minimum of 1

use std::time::Duration;

use crate::driver::ConnectOptions;

/// Default minimum signal-strength change for a sample to be retained.
pub const SIGNAL_DELTA_THRESHOLD: f64 = 20.0;

/// Default minimum elapsed time for a same-strength sample to be retained.
pub const SAMPLE_INTERVAL_THRESHOLD: Duration = Duration::from_secs(5);

/// Default minimum interval between successive snapshot broadcasts.
pub const BROADCAST_COOLDOWN: Duration = Duration::from_secs(1);

/// Configuration for a [`CentralScanner`](crate::CentralScanner).
///
/// ## Field semantics
/// - `signal_delta` / `sample_interval`: the observation noise filter — a
///   sample is kept when the strength delta exceeds `signal_delta` **or**
///   more than `sample_interval` elapsed since the last retained sample
/// - `broadcast_cooldown`: at most one snapshot broadcast per window
/// - `mailbox_capacity`: scanner mailbox bound; driver events that cannot
///   be enqueued are dropped with a warning (min 1; clamped)
/// - `max_history_per_device`: per-device history cap (`0` = unbounded,
///   the original behavior)
/// - `connect_options`: options attached to every connect command
#[derive(Clone, Debug)]
pub struct Config {
    /// Minimum signal-strength change (absolute) for a sample to be kept.
    pub signal_delta: f64,

    /// Minimum time between retained samples of similar strength.
    pub sample_interval: Duration,

    /// Cool-down between snapshot broadcasts. Within any shorter window at
    /// most one snapshot is emitted, carrying the full history at send time.
    pub broadcast_cooldown: Duration,

    /// Capacity of the scanner's mailbox.
    pub mailbox_capacity: usize,

    /// Per-device observation history cap.
    ///
    /// - `0` = unbounded (history only shrinks via `PurgeObservations`)
    /// - `n > 0` = at most `n` retained samples per device, oldest dropped
    pub max_history_per_device: usize,

    /// Options sent with every peripheral connect command.
    pub connect_options: ConnectOptions,
}

impl Config {
    /// Returns the mailbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn mailbox_capacity_clamped(&self) -> usize {
        self.mailbox_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `signal_delta = 20.0`
    /// - `sample_interval = 5s`
    /// - `broadcast_cooldown = 1s`
    /// - `mailbox_capacity = 1024`
    /// - `max_history_per_device = 0` (unbounded)
    /// - `connect_options = ConnectOptions::default()` (all notifications on)
    fn default() -> Self {
        Self {
            signal_delta: SIGNAL_DELTA_THRESHOLD,
            sample_interval: SAMPLE_INTERVAL_THRESHOLD,
            broadcast_cooldown: BROADCAST_COOLDOWN,
            mailbox_capacity: 1024,
            max_history_per_device: 0,
            connect_options: ConnectOptions::default(),
        }
    }
}
