//! # ListenerSet: non-blocking fan-out to subscriber addresses.
//!
//! [`ListenerSet`] distributes each [`ScanEvent`] to every registered
//! listener **without awaiting** any of them.
//!
//! ## What it guarantees
//! - `broadcast(&ScanEvent)` returns immediately.
//! - Per-listener FIFO (queue order).
//! - `add` is idempotent; `remove` of an absent address is a no-op.
//!
//! ## What it does **not** guarantee
//! - No ordering across different listeners.
//! - No retries on queue overflow: the event is dropped for that listener
//!   and a warning is logged.
//!
//! Membership changes only affect subsequent broadcasts; set mutation and
//! broadcasting both happen inside the scanner's sequential message
//! handling, so a broadcast is never interleaved with an add/remove.

use log::warn;
use tokio::sync::mpsc::error::TrySendError;

use crate::events::ScanEvent;

use super::listener::{ListenerId, ListenerRef};

/// Set of subscriber addresses, deduplicated by [`ListenerId`].
#[derive(Default)]
pub struct ListenerSet {
    members: Vec<ListenerRef>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Returns `false` when the address was already present.
    pub fn add(&mut self, listener: ListenerRef) -> bool {
        if self.contains(listener.id()) {
            return false;
        }
        self.members.push(listener);
        true
    }

    /// Removes a listener by id. Returns `false` when it was not present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.members.len();
        self.members.retain(|l| l.id() != id);
        self.members.len() != before
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.members.iter().any(|l| l.id() == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sends a clone of `event` to every member, non-blocking.
    ///
    /// A full or closed listener queue drops the event for that listener
    /// only; other members are unaffected.
    pub fn broadcast(&self, event: &ScanEvent) {
        for member in &self.members {
            match member.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(ev)) => {
                    warn!(
                        "listener {:?} dropped event {}: queue full",
                        member.id(),
                        ev.as_label()
                    );
                }
                Err(TrySendError::Closed(ev)) => {
                    warn!(
                        "listener {:?} dropped event {}: receiver gone",
                        member.id(),
                        ev.as_label()
                    );
                }
            }
        }
    }
}
