//! # The hardware driver seam.
//!
//! [`CentralDriver`] is the contract the scanner holds against the actual
//! Bluetooth stack. The crate never implements a driver itself; it issues
//! fire-and-forget commands through this trait and receives the results
//! later as [`ScanMessage`](crate::ScanMessage)s through the attached
//! [`DriverSink`](super::DriverSink).
//!
//! ## Contract
//! - Commands must not block: results (connects, disconnects, discoveries)
//!   arrive asynchronously through the sink.
//! - `attach` hands the driver its event sink; `detach` must synchronously
//!   stop the driver from reporting further events. The sink additionally
//!   guards itself, so a racing callback during detach is dropped rather
//!   than delivered.

use async_trait::async_trait;

use crate::observations::{Peripheral, ScanFilter};

use super::sink::DriverSink;

/// Options for a connect command. All notifications default to enabled.
#[derive(Clone, Copy, Debug)]
pub struct ConnectOptions {
    /// Notify when the connection state changes.
    pub notify_on_connection: bool,
    /// Notify when the peripheral disconnects.
    pub notify_on_disconnection: bool,
    /// Notify on characteristic notifications.
    pub notify_on_notification: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            notify_on_connection: true,
            notify_on_disconnection: true,
            notify_on_notification: true,
        }
    }
}

/// Contract for the central-role hardware driver.
///
/// Implementations wrap a platform Bluetooth stack (or a simulation) and
/// report everything that happens through the sink given to
/// [`attach`](CentralDriver::attach).
#[async_trait]
pub trait CentralDriver: Send + Sync + 'static {
    /// Hands the driver the sink it reports events into.
    ///
    /// Called once when the scanner is spawned, before any command.
    fn attach(&self, sink: DriverSink);

    /// Synchronously stops event reporting. Irreversible; called as part of
    /// scanner termination.
    fn detach(&self);

    /// Begin scanning, optionally restricted to the given services.
    async fn start_scan(&self, filter: Option<&ScanFilter>);

    /// Stop the active scan.
    async fn stop_scan(&self);

    /// Initiate a connection to a peripheral. The result arrives later as a
    /// connect-confirmed or failed-to-connect event.
    async fn connect(&self, peripheral: &Peripheral, options: &ConnectOptions);

    /// Tear down a connection. The result arrives later as a disconnect
    /// event.
    async fn disconnect(&self, peripheral: &Peripheral);
}
