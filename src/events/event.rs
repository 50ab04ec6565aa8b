//! # Outbound notifications sent to listeners.
//!
//! [`ScanEvent`] enumerates everything the scanner tells its subscribers.
//! Events are sent to each listener's own queue (see
//! [`ListenerSet`](crate::ListenerSet)); there is no ordering
//! guarantee across different listeners, only per-listener FIFO.

use std::sync::Arc;

use crate::core::SessionRef;
use crate::observations::{ObservationsSnapshot, Peripheral};

/// Notification delivered to every registered listener.
#[derive(Clone, Debug)]
pub enum ScanEvent {
    /// Full observation history at send time. Rate-limited by the broadcast
    /// cool-down: a burst of accepted discoveries collapses into one
    /// snapshot, never loses data.
    Snapshot(ObservationsSnapshot),
    /// A peripheral connection was confirmed and a session actor now manages
    /// it. `session` is the address of that child actor.
    PeripheralConnected {
        peripheral: Peripheral,
        session: SessionRef,
    },
    /// A peripheral connection ended, or a connection attempt failed.
    /// `reason` is `None` for a clean disconnect; a failed attempt always
    /// carries this event without a preceding `PeripheralConnected`.
    PeripheralDisconnected {
        peripheral: Peripheral,
        reason: Option<Arc<str>>,
    },
    /// The hardware power state changed.
    PowerChanged(bool),
}

impl ScanEvent {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScanEvent::Snapshot(_) => "snapshot",
            ScanEvent::PeripheralConnected { .. } => "peripheral_connected",
            ScanEvent::PeripheralDisconnected { .. } => "peripheral_disconnected",
            ScanEvent::PowerChanged(_) => "power_changed",
        }
    }
}
