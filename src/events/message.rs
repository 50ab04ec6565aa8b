//! # Inbound messages processed by the scanner actor.
//!
//! [`ScanMessage`] enumerates everything that can land in the scanner's
//! mailbox: commands from [`ScannerRef`](crate::ScannerRef) handles,
//! hardware events translated by the
//! [`DriverSink`](crate::DriverSink), and the scanner's own timer
//! wake-ups. One mailbox, one ordering — commands and hardware events
//! are interleaved exactly as they arrived.

use std::sync::Arc;
use std::time::Instant;

use crate::listeners::{ListenerId, ListenerRef};
use crate::observations::{AdvertisementData, Peripheral, ScanFilter};

/// Everything the scanner actor can receive.
///
/// The actor matches this exhaustively; some variants are handled
/// regardless of state, the rest dispatch on idle vs. scanning.
#[derive(Debug)]
pub enum ScanMessage {
    /// Begin scanning with an optional service filter. `requester` is
    /// subscribed as a listener before the hardware command is issued.
    StartScanning {
        filter: Option<ScanFilter>,
        requester: ListenerRef,
    },
    /// Stop the active scan. A no-op while idle.
    StopScanning,
    /// Subscribe a listener. Idempotent per listener identity.
    AddListener(ListenerRef),
    /// Unsubscribe the listener with this identity. A no-op when absent.
    RemoveListener(ListenerId),
    /// Forward a connect request to the driver.
    ConnectRequest(Peripheral),
    /// Forward a disconnect request to the driver.
    DisconnectRequest(Peripheral),
    /// Drop all retained observation history.
    PurgeObservations,
    /// Detach from the driver, stop all sessions, and stop the actor.
    Terminate,

    /// The hardware power state changed.
    PowerChanged(bool),
    /// A peripheral advertisement was observed. `at` is stamped when the
    /// driver callback was translated, not when the actor processes it.
    Discovered {
        peripheral: Peripheral,
        rssi: f64,
        advertisement: AdvertisementData,
        at: Instant,
    },
    /// The driver confirmed a connection.
    ConnectConfirmed(Peripheral),
    /// A connection ended. `reason` is `None` for a clean disconnect.
    Disconnected {
        peripheral: Peripheral,
        reason: Option<Arc<str>>,
    },
    /// A connection attempt failed before being established. Takes the
    /// same path as [`Disconnected`](ScanMessage::Disconnected).
    ConnectFailed {
        peripheral: Peripheral,
        reason: Option<Arc<str>>,
    },

    /// The broadcast cool-down elapsed; a suppressed snapshot may now go
    /// out. Sent by the throttle's own timer task through the mailbox so
    /// the flag is only ever touched by the actor.
    ThrottleExpired,
}

impl ScanMessage {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScanMessage::StartScanning { .. } => "start_scanning",
            ScanMessage::StopScanning => "stop_scanning",
            ScanMessage::AddListener(_) => "add_listener",
            ScanMessage::RemoveListener(_) => "remove_listener",
            ScanMessage::ConnectRequest(_) => "connect_request",
            ScanMessage::DisconnectRequest(_) => "disconnect_request",
            ScanMessage::PurgeObservations => "purge_observations",
            ScanMessage::Terminate => "terminate",
            ScanMessage::PowerChanged(_) => "power_changed",
            ScanMessage::Discovered { .. } => "discovered",
            ScanMessage::ConnectConfirmed(_) => "connect_confirmed",
            ScanMessage::Disconnected { .. } => "disconnected",
            ScanMessage::ConnectFailed { .. } => "connect_failed",
            ScanMessage::ThrottleExpired => "throttle_expired",
        }
    }
}
