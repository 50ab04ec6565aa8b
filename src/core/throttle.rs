//! # Broadcast throttle.
//!
//! Rate-limits snapshot broadcasts: after one fires, further accepted
//! discoveries stay quiet until the cool-down elapses. The reset is a
//! deferred one-shot task that delivers `ThrottleExpired` back into the
//! scanner's mailbox, so the flag is only ever flipped inside sequential
//! message handling — never by a background write.
//!
//! ```text
//! accepted observation ─► begin()? ──yes──► broadcast + spawn sleep(cooldown)
//!                              │                         │
//!                              no (suppressed)           ▼
//!                              ▼               mailbox ◄─ ThrottleExpired
//!                           drop (data is      (scanner calls expire())
//!                           still in history)
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time;

use crate::events::ScanMessage;

/// Suppression flag plus the pending one-shot reset task.
pub struct BroadcastThrottle {
    cooldown: Duration,
    suppressed: bool,
    reset: Option<AbortHandle>,
}

impl BroadcastThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            suppressed: false,
            reset: None,
        }
    }

    /// Claims a broadcast slot.
    ///
    /// Returns `false` while suppressed. Otherwise flips into the suppressed
    /// state, schedules the reset timer against `mailbox`, and returns
    /// `true` — the caller must then actually broadcast.
    pub fn begin(&mut self, mailbox: &mpsc::Sender<ScanMessage>) -> bool {
        if self.suppressed {
            return false;
        }
        self.suppressed = true;

        let cooldown = self.cooldown;
        let tx = mailbox.clone();
        let task = tokio::spawn(async move {
            time::sleep(cooldown).await;
            // Scanner gone: nothing left to unsuppress.
            let _ = tx.try_send(ScanMessage::ThrottleExpired);
        });
        self.reset = Some(task.abort_handle());
        true
    }

    /// Handles the `ThrottleExpired` message: broadcasts may flow again.
    pub fn expire(&mut self) {
        self.suppressed = false;
        self.reset = None;
    }

    /// Cancels the pending reset timer, if any. Called at scanner shutdown.
    pub fn cancel(&mut self) {
        if let Some(reset) = self.reset.take() {
            reset.abort();
        }
        self.suppressed = false;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}
