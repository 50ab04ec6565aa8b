//! Error types for the scanner actor boundary.
//!
//! Inside the actor nothing is fatal: unhandled messages are logged,
//! redundant operations are no-ops, and connection failures travel to
//! listeners as the `reason` field of a disconnect event. The only errors
//! surfaced as `Result`s are handle-side delivery failures.

use thiserror::Error;

/// Errors returned by [`ScannerRef`](crate::ScannerRef) operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScannerError {
    /// The scanner actor has terminated; its mailbox no longer accepts
    /// messages.
    #[error("scanner mailbox closed; the actor has terminated")]
    MailboxClosed,
}

impl ScannerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use scanvisor::ScannerError;
    ///
    /// assert_eq!(ScannerError::MailboxClosed.as_label(), "mailbox_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScannerError::MailboxClosed => "mailbox_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScannerError::MailboxClosed => "scanner mailbox closed".to_string(),
        }
    }
}
