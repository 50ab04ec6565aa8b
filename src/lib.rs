//! # scanvisor
//!
//! **scanvisor** turns a callback-driven Bluetooth central (scan, connect,
//! track peripherals) into a message-passing actor: every hardware callback
//! becomes a mailbox message, and all scanner state is mutated only by
//! sequential message handling. No locks guard the observation history, the
//! connection table, the listener set, or the throttle flag — the actor's
//! single-consumer mailbox is the concurrency story.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  Listeners / UI                         Hardware driver (CentralDriver)
//!  ──────────────                         ──────────────────────────────
//!  ScannerRef::start_scanning(...)          callbacks: power / discovery /
//!  ScannerRef::connect(...)                 connect / disconnect / failure
//!        │                                        │
//!        │ commands                               │ DriverSink (stateless
//!        ▼                                        ▼  callback→message adapter)
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  mailbox (mpsc, bounded) — one ScanMessage at a time                │
//! │                                                                     │
//! │  CentralScanner (state machine: Idle ⇄ Scanning)                    │
//! │   ├─ ObservationStore   per-device history, noise filter            │
//! │   ├─ BroadcastThrottle  ≤1 snapshot per cool-down window            │
//! │   ├─ ListenerSet        explicit addresses, try_send fan-out        │
//! │   └─ ConnectionTable    device → PeripheralSession child actor      │
//! └──────┬──────────────────────────────────┬───────────────────────────┘
//!        │ ScanEvent per listener queue     │ spawn / cancel
//!        ▼                                  ▼
//!  listener channels                 PeripheralSession actors
//!  (Snapshot, PeripheralConnected,   (one per live connection,
//!   PeripheralDisconnected,           cancellable child tokens)
//!   PowerChanged)
//! ```
//!
//! ### Message flow
//! ```text
//! driver discovery ─► Discovered ─► record()?
//!                                     ├─ discarded (noise) ─► nothing
//!                                     └─ accepted ─► throttle.begin()?
//!                                          ├─ suppressed ─► nothing (data
//!                                          │               stays in history)
//!                                          └─ allowed ─► Snapshot to every
//!                                                        listener, then
//!                                                        sleep(cooldown) ─►
//!                                                        ThrottleExpired
//! ```
//!
//! ## Guarantees
//! - **Sequential mutation**: no two messages of one scanner run
//!   concurrently; driver callbacks never execute scanner logic inline.
//! - **Per-source ordering**: messages from one source are processed in
//!   arrival order; nothing is guaranteed across sources.
//! - **Non-blocking**: driver commands are fire-and-forget; fan-out and the
//!   throttle reset never block the actor.
//! - **Idempotence**: duplicate listener adds, duplicate connect
//!   confirmations, disconnects for unknown devices, and `StopScanning`
//!   while idle are all no-ops, never errors.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use scanvisor::{CentralScanner, Config, ScanEvent, listener_channel};
//! # use scanvisor::{CentralDriver, ConnectOptions, DriverSink, Peripheral, ScanFilter};
//! # struct MyDriver;
//! # #[async_trait::async_trait]
//! # impl CentralDriver for MyDriver {
//! #     fn attach(&self, _sink: DriverSink) {}
//! #     fn detach(&self) {}
//! #     async fn start_scan(&self, _filter: Option<&ScanFilter>) {}
//! #     async fn stop_scan(&self) {}
//! #     async fn connect(&self, _p: &Peripheral, _o: &ConnectOptions) {}
//! #     async fn disconnect(&self, _p: &Peripheral) {}
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = Arc::new(MyDriver);
//!     let scanner = CentralScanner::spawn(Config::default(), driver);
//!
//!     let (listener, mut events) = listener_channel(64);
//!     scanner.start_scanning(None, listener).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             ScanEvent::Snapshot(devices) => {
//!                 println!("{} device(s) observed", devices.len());
//!             }
//!             ScanEvent::PeripheralConnected { peripheral, .. } => {
//!                 println!("connected: {}", peripheral.id);
//!             }
//!             ScanEvent::PeripheralDisconnected { peripheral, reason } => {
//!                 println!("disconnected: {} ({reason:?})", peripheral.id);
//!             }
//!             ScanEvent::PowerChanged(on) => println!("powered on: {on}"),
//!         }
//!     }
//!
//!     scanner.terminate().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod driver;
mod error;
mod events;
mod listeners;
mod observations;

// ---- Public re-exports ----

pub use core::{
    BROADCAST_COOLDOWN, CentralScanner, Config, SAMPLE_INTERVAL_THRESHOLD, ScannerRef,
    SessionRef, SIGNAL_DELTA_THRESHOLD,
};
pub use driver::{CentralDriver, ConnectOptions, DriverSink};
pub use error::ScannerError;
pub use events::{ScanEvent, ScanMessage};
pub use listeners::{ListenerId, ListenerRef, ListenerSet, listener_channel};
pub use observations::{
    AdvertisementData, DeviceId, Observation, ObservationStore, ObservationsSnapshot,
    Peripheral, ScanFilter, ServiceUuid,
};
