//! # Connection table: device identity → live session actor.
//!
//! The table owns every [`SessionHandle`] exclusively. A session's lifetime
//! is tied 1:1 to its entry: spawned on insert, told to terminate on
//! removal. All mutation happens inside the scanner's sequential message
//! handling.
//!
//! ## Rules
//! - Insert for an already-tracked device is an idempotent no-op (no double
//!   spawn).
//! - Removal of an unknown device is a no-op.
//! - Shutdown cancels every session fire-and-forget; termination is not
//!   awaited.

use std::collections::HashMap;

use log::debug;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::session::{PeripheralSession, SessionMessage, SessionRef};
use crate::observations::{DeviceId, Peripheral};

/// Handle to a running session actor.
struct SessionHandle {
    /// Address of the session.
    session: SessionRef,
    /// Individual cancellation token for this session.
    cancel: CancellationToken,
    /// Join handle for the session's run loop. Held so a slow teardown can
    /// still be observed in tests; never awaited on the scanner's path.
    #[allow(dead_code)]
    join: JoinHandle<()>,
}

/// Maps device identities to the child actors managing their connections.
#[derive(Default)]
pub struct ConnectionTable {
    sessions: HashMap<DeviceId, SessionHandle>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, device: &DeviceId) -> bool {
        self.sessions.contains_key(device)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawns a session for a confirmed connection and records it.
    ///
    /// Returns the new session's address, or `None` when the device is
    /// already tracked (the duplicate confirmation is ignored).
    pub fn insert(
        &mut self,
        peripheral: &Peripheral,
        runtime_token: &CancellationToken,
    ) -> Option<SessionRef> {
        if self.contains(&peripheral.id) {
            debug!("connect confirmed for {} ignored: already tracked", peripheral.id);
            return None;
        }

        let cancel = runtime_token.child_token();
        let (session, join) = PeripheralSession::spawn(peripheral.id.clone(), cancel.clone());
        session.send(SessionMessage::SetPeripheral(peripheral.clone()));

        self.sessions.insert(
            peripheral.id.clone(),
            SessionHandle {
                session: session.clone(),
                cancel,
                join,
            },
        );
        Some(session)
    }

    /// Removes a device's entry and tells its session to terminate.
    ///
    /// Returns `false` when the device was not tracked — a disconnect for an
    /// unknown device is not an error.
    pub fn remove(&mut self, device: &DeviceId) -> bool {
        match self.sessions.remove(device) {
            Some(handle) => {
                handle.session.send(SessionMessage::Terminate);
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every session. Fire-and-forget: termination is asynchronous
    /// and not awaited.
    pub fn shutdown_all(&mut self) {
        for (device, handle) in self.sessions.drain() {
            debug!("cancelling session {device}");
            handle.session.send(SessionMessage::Terminate);
            handle.cancel.cancel();
        }
    }
}
