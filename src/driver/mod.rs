//! The seam between the scanner and the hardware driver.
//!
//! - [`CentralDriver`] — commands the scanner issues (fire-and-forget)
//! - [`DriverSink`] — callbacks the driver reports, translated into mailbox
//!   messages

mod central;
mod sink;

pub use central::{CentralDriver, ConnectOptions};
pub use sink::DriverSink;
