//! Message and event data model.
//!
//! - [`ScanMessage`] — everything that can arrive in the scanner's mailbox
//! - [`ScanEvent`] — everything the scanner pushes to listeners
//!
//! Both are closed sum types; the scanner matches them exhaustively.

mod event;
mod message;

pub use event::ScanEvent;
pub use message::ScanMessage;
