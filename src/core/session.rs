//! # PeripheralSession: child actor for one live connection.
//!
//! The scanner spawns one session per confirmed connection and addresses it
//! only through [`SessionRef`]. The session owns its peripheral state
//! exclusively; nothing reaches it via shared memory.
//!
//! ## Lifecycle
//! ```text
//! ConnectConfirmed ──► spawn(run) ──► receives SetPeripheral(handle)
//!                                        │
//!        Disconnected / scanner shutdown │
//!                 cancel token ──────────┴──► loop exits, session dropped
//! ```
//!
//! Cancellation is cooperative: the run loop selects on the token at every
//! message boundary, so termination never interrupts message handling
//! mid-flight.

use log::{debug, trace};
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::observations::{DeviceId, Peripheral};

/// Mailbox capacity of a session actor. Sessions receive few messages (the
/// initial handle plus termination), so a small bound suffices.
const SESSION_MAILBOX: usize = 16;

/// Messages a session actor understands.
#[derive(Clone, Debug)]
pub(crate) enum SessionMessage {
    /// Initial configuration: the peripheral this session manages.
    SetPeripheral(Peripheral),
    /// Stop the session. Equivalent to cancelling its token.
    Terminate,
}

/// Address of a running [`PeripheralSession`].
#[derive(Clone, Debug)]
pub struct SessionRef {
    tx: mpsc::Sender<SessionMessage>,
}

impl SessionRef {
    pub(crate) fn send(&self, msg: SessionMessage) {
        // Fire-and-forget: a session that already stopped ignores the rest.
        let _ = self.tx.try_send(msg);
    }

    /// True once the session's mailbox has closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Child actor managing one peripheral connection.
pub struct PeripheralSession {
    device: DeviceId,
    peripheral: Option<Peripheral>,
}

impl PeripheralSession {
    /// Spawns a session for `device`, cancellable via `token`.
    ///
    /// Returns the session's address and its join handle. The caller (the
    /// connection table) owns both.
    pub(crate) fn spawn(device: DeviceId, token: CancellationToken) -> (SessionRef, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(SESSION_MAILBOX);
        let session = Self {
            device,
            peripheral: None,
        };
        let join = tokio::spawn(session.run(rx, token));
        (SessionRef { tx }, join)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SessionMessage>, token: CancellationToken) {
        loop {
            select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    None => break,
                    Some(SessionMessage::SetPeripheral(peripheral)) => {
                        trace!("session {}: peripheral handle set", self.device);
                        self.peripheral = Some(peripheral);
                    }
                    Some(SessionMessage::Terminate) => break,
                },
            }
        }
        debug!(
            "session {} stopped (configured={})",
            self.device,
            self.peripheral.is_some()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_stops_on_terminate() {
        let token = CancellationToken::new();
        let (session, join) = PeripheralSession::spawn("d1".into(), token);
        session.send(SessionMessage::SetPeripheral(Peripheral::new("d1")));
        session.send(SessionMessage::Terminate);
        join.await.unwrap();
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_session_stops_on_cancel() {
        let token = CancellationToken::new();
        let (_session, join) = PeripheralSession::spawn("d1".into(), token.clone());
        token.cancel();
        join.await.unwrap();
    }
}
