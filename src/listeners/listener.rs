//! # Listener addresses.
//!
//! A listener is an explicit address the scanner can send [`ScanEvent`]s to:
//! a bounded channel sender plus a process-unique id. The id is what gives
//! channel endpoints an identity, so membership in the
//! [`ListenerSet`](super::ListenerSet) can be idempotent.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::events::ScanEvent;

/// Global counter for listener ids.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a listener address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_SEQ.fetch_add(1, Ordering::Relaxed))
    }
}

/// Subscriber address: where the scanner delivers [`ScanEvent`]s.
///
/// Cloneable; clones share the same id and queue, so adding a clone to the
/// set has no additional effect.
#[derive(Clone, Debug)]
pub struct ListenerRef {
    id: ListenerId,
    tx: mpsc::Sender<ScanEvent>,
}

impl ListenerRef {
    pub(crate) fn new(tx: mpsc::Sender<ScanEvent>) -> Self {
        Self {
            id: ListenerId::next(),
            tx,
        }
    }

    /// The stable identity of this address.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn try_send(&self, event: ScanEvent) -> Result<(), mpsc::error::TrySendError<ScanEvent>> {
        self.tx.try_send(event)
    }
}

/// Creates a listener address and the receiving half its owner reads from.
///
/// `capacity` bounds the listener's queue (min 1, clamped). When the queue
/// is full, events for this listener are dropped with a warning; a slow
/// listener never blocks the scanner.
pub fn listener_channel(capacity: usize) -> (ListenerRef, mpsc::Receiver<ScanEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ListenerRef::new(tx), rx)
}
