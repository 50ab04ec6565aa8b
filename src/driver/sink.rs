//! # DriverSink: the callback→message adapter.
//!
//! Hardware callbacks must never mutate scanner state directly. The sink
//! owns no state of its own beyond a mailbox sender and a shared detach
//! flag: each callback is wrapped into one immutable
//! [`ScanMessage`](crate::ScanMessage) and enqueued, so all driver
//! asynchrony appears to the scanner as ordinary sequential message
//! arrival.
//!
//! ## Rules
//! - Enqueueing is non-blocking (`try_send`); when the mailbox is full the
//!   event is dropped with a warning rather than stalling the driver's
//!   callback thread.
//! - After [`DriverSink::detach`] every delivery is silently dropped. Detach
//!   is synchronous and irreversible; no callback arriving afterwards can
//!   reach the scanner.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::events::ScanMessage;
use crate::observations::{AdvertisementData, Peripheral};

/// Translates driver callbacks into scanner mailbox messages.
///
/// Cloneable: a driver may deliver events from several internal threads;
/// clones share the mailbox and the detach flag.
#[derive(Clone, Debug)]
pub struct DriverSink {
    tx: mpsc::Sender<ScanMessage>,
    detached: Arc<AtomicBool>,
}

impl DriverSink {
    pub(crate) fn new(tx: mpsc::Sender<ScanMessage>, detached: Arc<AtomicBool>) -> Self {
        Self { tx, detached }
    }

    /// The hardware power state changed.
    pub fn power_changed(&self, powered_on: bool) {
        self.deliver(ScanMessage::PowerChanged(powered_on));
    }

    /// A peripheral was discovered. The sample is stamped at translation
    /// time.
    pub fn discovered(&self, peripheral: Peripheral, rssi: f64, advertisement: AdvertisementData) {
        self.deliver(ScanMessage::Discovered {
            peripheral,
            rssi,
            advertisement,
            at: Instant::now(),
        });
    }

    /// A connection was confirmed.
    pub fn connected(&self, peripheral: Peripheral) {
        self.deliver(ScanMessage::ConnectConfirmed(peripheral));
    }

    /// A connection ended. `reason` is `None` for a clean disconnect.
    pub fn disconnected(&self, peripheral: Peripheral, reason: Option<Arc<str>>) {
        self.deliver(ScanMessage::Disconnected { peripheral, reason });
    }

    /// A connection attempt failed before being established.
    pub fn failed_to_connect(&self, peripheral: Peripheral, reason: Option<Arc<str>>) {
        self.deliver(ScanMessage::ConnectFailed { peripheral, reason });
    }

    /// Stops translation permanently. Safe to call more than once.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// True once the sink has been detached.
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    fn deliver(&self, msg: ScanMessage) {
        if self.is_detached() {
            debug!("driver event {} dropped: sink detached", msg.as_label());
            return;
        }
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                warn!("driver event {} dropped: mailbox full", msg.as_label());
            }
            Err(TrySendError::Closed(msg)) => {
                debug!("driver event {} dropped: scanner stopped", msg.as_label());
            }
        }
    }
}
