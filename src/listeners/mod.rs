//! Explicit listener addresses and the scanner's subscription set.
//!
//! There is no hidden global notification channel: fan-out goes to an
//! explicit, auditable set of [`ListenerRef`] addresses.

mod listener;
mod set;

pub use listener::{ListenerId, ListenerRef, listener_channel};
pub use set::ListenerSet;
