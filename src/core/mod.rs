//! Actor core: the scanner and its owned components.
//!
//! This module contains the embedded implementation of the scanning actor.
//! Public API from here: [`CentralScanner`] / [`ScannerRef`] (the actor and
//! its address), [`Config`], and [`SessionRef`] (the address of a child
//! connection actor, carried by connect events).
//!
//! Internal modules:
//! - [`scanner`]: the state machine and mailbox loop;
//! - [`session`]: one child actor per live peripheral connection;
//! - [`connections`]: device → session table and child lifecycle;
//! - [`throttle`]: snapshot broadcast rate limiting;
//! - [`config`]: runtime tunables.

mod config;
mod connections;
mod scanner;
mod session;
mod throttle;

pub use config::{
    BROADCAST_COOLDOWN, Config, SAMPLE_INTERVAL_THRESHOLD, SIGNAL_DELTA_THRESHOLD,
};
pub use scanner::{CentralScanner, ScannerRef};
pub use session::SessionRef;
