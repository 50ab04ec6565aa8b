//! # CentralScanner: the scanning actor and its state machine.
//!
//! The scanner owns every piece of mutable state — observation history,
//! connection table, listener set, throttle flag — and mutates it only
//! while handling one mailbox message at a time. Hardware callbacks reach
//! it as messages (via [`DriverSink`]), commands reach it as messages (via
//! [`ScannerRef`]), and the throttle reset timer reaches it as a message
//! too. Nothing else touches its state.
//!
//! ## State machine
//! ```text
//!            StartScanning(filter, requester)
//!   Idle ───────────────────────────────────► Scanning(filter)
//!     ▲      (requester subscribed; message        │
//!     │       handed to the Scanning handler,      │ first StartScanning seen
//!     │       which owns command issuance)         │ while scanning issues
//!     │                                            │ driver start_scan once
//!     │                                            │
//!     └──────────────────── StopScanning ──────────┘
//!                           (driver stop_scan)
//!
//!   Scanning + PowerChanged(true)  → re-issue start_scan (driver reset)
//!   Idle     + StopScanning        → logged no-op
//!   any      + AddListener/RemoveListener/PurgeObservations → state unchanged
//!   any      + Terminate           → detach driver, stop sessions, stop actor
//!   unrecognized for state         → logged, dropped, never fatal
//! ```
//!
//! ## Rules
//! - One message at a time; no two messages of one scanner run concurrently.
//! - Driver commands are fire-and-forget; their results arrive later as
//!   separate messages.
//! - `StopScanning` does not cancel in-flight discoveries already enqueued;
//!   they are still recorded.
//! - Detaching from the driver is the first step of termination, so no
//!   callback arriving afterwards can mutate state.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use log::debug;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::core::connections::ConnectionTable;
use crate::core::throttle::BroadcastThrottle;
use crate::driver::{CentralDriver, DriverSink};
use crate::error::ScannerError;
use crate::events::{ScanEvent, ScanMessage};
use crate::listeners::{ListenerId, ListenerRef, ListenerSet};
use crate::observations::{Observation, ObservationStore, Peripheral, ScanFilter};

/// The scanner's externally observable mode.
#[derive(Clone, Debug)]
enum ScannerState {
    /// Not scanning. Initial state.
    Idle,
    /// Actively scanning with an optional service filter.
    Scanning { filter: Option<ScanFilter> },
}

/// Address of a running [`CentralScanner`].
///
/// All methods enqueue one message and return; the scanner processes them
/// in arrival order. The only failure is a terminated scanner
/// ([`ScannerError::MailboxClosed`]).
#[derive(Clone, Debug)]
pub struct ScannerRef {
    tx: mpsc::Sender<ScanMessage>,
}

impl ScannerRef {
    /// Begin scanning. `requester` is implicitly subscribed as a listener.
    pub async fn start_scanning(
        &self,
        filter: Option<ScanFilter>,
        requester: ListenerRef,
    ) -> Result<(), ScannerError> {
        self.send(ScanMessage::StartScanning { filter, requester }).await
    }

    /// Stop the active scan. A no-op while idle.
    pub async fn stop_scanning(&self) -> Result<(), ScannerError> {
        self.send(ScanMessage::StopScanning).await
    }

    /// Subscribe a listener. Idempotent.
    pub async fn add_listener(&self, listener: ListenerRef) -> Result<(), ScannerError> {
        self.send(ScanMessage::AddListener(listener)).await
    }

    /// Unsubscribe a listener. A no-op when absent.
    pub async fn remove_listener(&self, id: ListenerId) -> Result<(), ScannerError> {
        self.send(ScanMessage::RemoveListener(id)).await
    }

    /// Forward a connect request to the driver.
    pub async fn connect(&self, peripheral: Peripheral) -> Result<(), ScannerError> {
        self.send(ScanMessage::ConnectRequest(peripheral)).await
    }

    /// Forward a disconnect request to the driver.
    pub async fn disconnect(&self, peripheral: Peripheral) -> Result<(), ScannerError> {
        self.send(ScanMessage::DisconnectRequest(peripheral)).await
    }

    /// Drop all retained observation history.
    pub async fn purge_observations(&self) -> Result<(), ScannerError> {
        self.send(ScanMessage::PurgeObservations).await
    }

    /// Detach from the driver, stop all sessions, and stop the actor.
    pub async fn terminate(&self) -> Result<(), ScannerError> {
        self.send(ScanMessage::Terminate).await
    }

    /// True once the scanner has terminated and its mailbox closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, msg: ScanMessage) -> Result<(), ScannerError> {
        self.tx.send(msg).await.map_err(|_| ScannerError::MailboxClosed)
    }
}

/// The central-scanning actor.
///
/// Spawn with [`CentralScanner::spawn`]; interact through the returned
/// [`ScannerRef`] and through listener channels
/// ([`listener_channel`](crate::listener_channel)).
pub struct CentralScanner {
    cfg: Config,
    driver: Arc<dyn CentralDriver>,
    state: ScannerState,
    /// Whether a driver scan command is believed active. Guards against
    /// re-issuing `start_scan` for duplicate `StartScanning` messages;
    /// cleared on power loss so a power-on can recover the scan.
    scan_active: bool,
    observations: ObservationStore,
    connections: ConnectionTable,
    listeners: ListenerSet,
    throttle: BroadcastThrottle,
    /// Sender into our own mailbox, used by the throttle's timer task.
    self_tx: mpsc::Sender<ScanMessage>,
    /// The sink handed to the driver; detached synchronously at terminate.
    sink: DriverSink,
    /// Parent token for all session actors.
    runtime_token: CancellationToken,
}

impl CentralScanner {
    /// Spawns the scanner actor: attaches a [`DriverSink`] to `driver`,
    /// starts the mailbox loop, and returns the scanner's address.
    ///
    /// The scanner starts in the idle state and holds no history.
    pub fn spawn(cfg: Config, driver: Arc<dyn CentralDriver>) -> ScannerRef {
        let (tx, rx) = mpsc::channel(cfg.mailbox_capacity_clamped());
        let sink = DriverSink::new(tx.clone(), Arc::new(AtomicBool::new(false)));
        driver.attach(sink.clone());

        let scanner = Self {
            observations: ObservationStore::new(&cfg),
            throttle: BroadcastThrottle::new(cfg.broadcast_cooldown),
            connections: ConnectionTable::new(),
            listeners: ListenerSet::new(),
            state: ScannerState::Idle,
            scan_active: false,
            self_tx: tx.clone(),
            runtime_token: CancellationToken::new(),
            driver,
            sink,
            cfg,
        };
        tokio::spawn(scanner.run(rx));
        ScannerRef { tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ScanMessage>) {
        while let Some(msg) = rx.recv().await {
            if self.handle(msg).await.is_break() {
                break;
            }
        }
        debug!("scanner stopped");
    }

    /// Processes one message to completion.
    async fn handle(&mut self, msg: ScanMessage) -> ControlFlow<()> {
        match msg {
            // State-independent traffic.
            ScanMessage::AddListener(listener) => {
                if !self.listeners.add(listener) {
                    debug!("add_listener: address already subscribed");
                }
            }
            ScanMessage::RemoveListener(id) => {
                if !self.listeners.remove(id) {
                    debug!("remove_listener: address {id:?} not subscribed");
                }
            }
            ScanMessage::PurgeObservations => self.observations.purge(),
            ScanMessage::ThrottleExpired => self.throttle.expire(),
            ScanMessage::PowerChanged(powered_on) => self.on_power_changed(powered_on).await,
            // Stopping the scan does not cancel discoveries already in the
            // mailbox; they are recorded regardless of state.
            ScanMessage::Discovered {
                peripheral,
                rssi,
                advertisement,
                at,
            } => {
                let obs = Observation::new(peripheral, rssi, advertisement, at);
                if self.observations.record(obs) {
                    self.broadcast_snapshot();
                }
            }
            ScanMessage::Terminate => {
                self.shutdown();
                return ControlFlow::Break(());
            }

            // Everything else depends on the current state.
            msg => {
                if matches!(self.state, ScannerState::Idle) {
                    self.handle_idle(msg).await;
                } else {
                    self.handle_scanning(msg).await;
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Idle-state handler.
    async fn handle_idle(&mut self, msg: ScanMessage) {
        match msg {
            ScanMessage::StartScanning { filter, requester } => {
                self.state = ScannerState::Scanning {
                    filter: filter.clone(),
                };
                self.scan_active = false;
                // Hand straight to the scanning handler so command issuance
                // and all filter-dependent logic live in one place, and the
                // command cannot be lost to mailbox pressure.
                self.handle_scanning(ScanMessage::StartScanning { filter, requester })
                    .await;
            }
            ScanMessage::StopScanning => {
                debug!("stop_scanning while idle: already stopped");
            }
            other => {
                debug!("unhandled message {} in idle state", other.as_label());
            }
        }
    }

    /// Scanning-state handler.
    async fn handle_scanning(&mut self, msg: ScanMessage) {
        match msg {
            ScanMessage::StartScanning { filter: _, requester } => {
                self.listeners.add(requester);
                if self.scan_active {
                    debug!("start_scanning while already scanning: command not re-issued");
                } else {
                    let filter = self.scanning_filter();
                    self.driver.start_scan(filter.as_ref()).await;
                    self.scan_active = true;
                }
            }
            ScanMessage::StopScanning => {
                self.driver.stop_scan().await;
                self.state = ScannerState::Idle;
                self.scan_active = false;
            }
            ScanMessage::ConnectRequest(peripheral) => {
                // Pass-through; the table changes only on confirmation.
                self.driver.connect(&peripheral, &self.cfg.connect_options).await;
            }
            ScanMessage::DisconnectRequest(peripheral) => {
                self.driver.disconnect(&peripheral).await;
            }
            ScanMessage::ConnectConfirmed(peripheral) => self.on_connected(peripheral),
            ScanMessage::Disconnected { peripheral, reason } => {
                self.on_disconnected(peripheral, reason);
            }
            ScanMessage::ConnectFailed { peripheral, reason } => {
                // A failed attempt takes the disconnect path; listeners tell
                // the cases apart only via `reason`.
                self.on_disconnected(peripheral, reason);
            }
            other => {
                debug!("unhandled message {} in scanning state", other.as_label());
            }
        }
    }

    /// Power changes are fanned out to listeners in every state; while
    /// scanning, a power-on re-issues the scan command because a driver
    /// reset silently drops an active scan.
    async fn on_power_changed(&mut self, powered_on: bool) {
        self.listeners.broadcast(&ScanEvent::PowerChanged(powered_on));

        let filter = match &self.state {
            ScannerState::Scanning { filter } => filter.clone(),
            ScannerState::Idle => return,
        };
        if powered_on {
            self.driver.start_scan(filter.as_ref()).await;
            self.scan_active = true;
        } else {
            self.scan_active = false;
        }
    }

    fn on_connected(&mut self, peripheral: Peripheral) {
        if let Some(session) = self.connections.insert(&peripheral, &self.runtime_token) {
            self.listeners
                .broadcast(&ScanEvent::PeripheralConnected { peripheral, session });
        }
    }

    fn on_disconnected(&mut self, peripheral: Peripheral, reason: Option<Arc<str>>) {
        // Emitted even for devices that were never tracked, so listeners
        // always see the terminal event of a connection attempt.
        self.connections.remove(&peripheral.id);
        self.listeners
            .broadcast(&ScanEvent::PeripheralDisconnected { peripheral, reason });
    }

    /// Sends the full history to all listeners unless the throttle is in
    /// its cool-down window.
    fn broadcast_snapshot(&mut self) {
        if self.throttle.begin(&self.self_tx) {
            let snapshot = self.observations.snapshot();
            self.listeners.broadcast(&ScanEvent::Snapshot(snapshot));
        }
    }

    fn shutdown(&mut self) {
        // Detach first: no callback after this point becomes a message.
        self.sink.detach();
        self.driver.detach();
        self.throttle.cancel();
        self.connections.shutdown_all();
        self.runtime_token.cancel();
        debug!("scanner terminated");
    }

    fn scanning_filter(&self) -> Option<ScanFilter> {
        match &self.state {
            ScannerState::Scanning { filter } => filter.clone(),
            ScannerState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    use super::*;
    use crate::driver::ConnectOptions;
    use crate::listeners::listener_channel;
    use crate::observations::{AdvertisementData, DeviceId};

    #[derive(Clone, Debug, PartialEq)]
    enum DriverCall {
        StartScan(Option<ScanFilter>),
        StopScan,
        Connect(DeviceId),
        Disconnect(DeviceId),
        Detach,
    }

    /// Records every command and captures the sink handed over at attach,
    /// so tests can play the hardware side.
    #[derive(Default)]
    struct MockDriver {
        calls: Mutex<Vec<DriverCall>>,
        sink: Mutex<Option<DriverSink>>,
    }

    impl MockDriver {
        fn arc() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn sink(&self) -> DriverSink {
            self.sink.lock().unwrap().clone().expect("driver not attached")
        }

        fn calls(&self) -> Vec<DriverCall> {
            self.calls.lock().unwrap().clone()
        }

        fn scan_starts(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, DriverCall::StartScan(_)))
                .count()
        }

        fn push(&self, call: DriverCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl CentralDriver for MockDriver {
        fn attach(&self, sink: DriverSink) {
            *self.sink.lock().unwrap() = Some(sink);
        }

        fn detach(&self) {
            self.push(DriverCall::Detach);
        }

        async fn start_scan(&self, filter: Option<&ScanFilter>) {
            self.push(DriverCall::StartScan(filter.cloned()));
        }

        async fn stop_scan(&self) {
            self.push(DriverCall::StopScan);
        }

        async fn connect(&self, peripheral: &Peripheral, _options: &ConnectOptions) {
            self.push(DriverCall::Connect(peripheral.id.clone()));
        }

        async fn disconnect(&self, peripheral: &Peripheral) {
            self.push(DriverCall::Disconnect(peripheral.id.clone()));
        }
    }

    fn adv() -> AdvertisementData {
        Arc::new(HashMap::new())
    }

    /// Lets the scanner task drain its mailbox (paused-time tests).
    async fn settle() {
        time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_scanning_issues_one_command_and_subscribes() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        assert_eq!(driver.calls(), vec![DriverCall::StartScan(None)]);

        // The requester is now a listener: it sees fan-out traffic.
        driver.sink().power_changed(true);
        settle().await;
        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::PowerChanged(true))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_double_scan_start_while_scanning() {
        // A duplicate StartScanning adds the requester but never
        // re-issues the hardware command.
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, _rx1) = listener_channel(16);
        let (l2, mut rx2) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        scanner.start_scanning(None, l2).await.unwrap();
        settle().await;

        assert_eq!(driver.scan_starts(), 1);

        // The duplicate requester still became a listener.
        driver.sink().power_changed(true);
        settle().await;
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_command_survives_mailbox_pressure() {
        let driver = MockDriver::arc();
        let cfg = Config {
            mailbox_capacity: 1,
            ..Config::default()
        };
        let scanner = CentralScanner::spawn(cfg, driver.clone());
        let (l1, _rx1) = listener_channel(16);

        // The second send parks on the full one-slot mailbox, so any free
        // slot during StartScanning handling is already spoken for. The
        // hardware command must be issued anyway.
        scanner.start_scanning(None, l1).await.unwrap();
        scanner.purge_observations().await.unwrap();
        settle().await;

        assert_eq!(driver.calls(), vec![DriverCall::StartScan(None)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_start_issues_again() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, _rx1) = listener_channel(16);

        scanner.start_scanning(None, l1.clone()).await.unwrap();
        settle().await;
        scanner.stop_scanning().await.unwrap();
        settle().await;
        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::StartScan(None),
                DriverCall::StopScan,
                DriverCall::StartScan(None),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_idle_is_noop() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());

        scanner.stop_scanning().await.unwrap();
        settle().await;

        assert!(driver.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_filter_reaches_driver() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, _rx1) = listener_channel(16);
        let filter: ScanFilter = vec!["heart-rate".into()];

        scanner.start_scanning(Some(filter.clone()), l1).await.unwrap();
        settle().await;

        assert_eq!(driver.calls(), vec![DriverCall::StartScan(Some(filter))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_power_on_reissues_scan_after_reset() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, _rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;
        assert_eq!(driver.scan_starts(), 1);

        // Driver reset: power dropped, then came back.
        driver.sink().power_changed(false);
        driver.sink().power_changed(true);
        settle().await;

        assert_eq!(driver.scan_starts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_broadcasts_snapshot() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().discovered(Peripheral::new("d1"), -60.0, adv());
        settle().await;

        match rx1.try_recv() {
            Ok(ScanEvent::Snapshot(snap)) => {
                assert_eq!(snap.len(), 1);
                assert_eq!(snap.get(&"d1".into()).unwrap().len(), 1);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_discarded_sample_never_broadcasts() {
        // -60 then -61 within the interval is noise.
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().discovered(Peripheral::new("d1"), -60.0, adv());
        settle().await;
        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::Snapshot(_))));

        // Wait out the cool-down so a broadcast would be allowed.
        time::sleep(Duration::from_millis(1100)).await;

        driver.sink().discovered(Peripheral::new("d1"), -61.0, adv());
        settle().await;
        assert!(rx1.try_recv().is_err(), "noise sample must not broadcast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_collapses_burst_without_losing_data() {
        // One broadcast per cool-down window; the next broadcast after
        // the window carries every device observed meanwhile.
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().discovered(Peripheral::new("d1"), -60.0, adv());
        driver.sink().discovered(Peripheral::new("d2"), -50.0, adv());
        driver.sink().discovered(Peripheral::new("d3"), -40.0, adv());
        settle().await;

        // Exactly one snapshot inside the window.
        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::Snapshot(_))));
        assert!(rx1.try_recv().is_err());

        // After the window, an accepted sample broadcasts the full history.
        time::sleep(Duration::from_millis(1100)).await;
        driver.sink().discovered(Peripheral::new("d4"), -30.0, adv());
        settle().await;

        match rx1.try_recv() {
            Ok(ScanEvent::Snapshot(snap)) => {
                for id in ["d1", "d2", "d3", "d4"] {
                    assert!(snap.contains_key(&id.into()), "{id} missing from snapshot");
                }
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_accepted_sample_extends_history() {
        // -60 then -30 after 500ms; delta 30 exceeds the threshold.
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().discovered(Peripheral::new("d1"), -60.0, adv());
        settle().await;
        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::Snapshot(_))));

        time::sleep(Duration::from_millis(1100)).await;
        driver.sink().discovered(Peripheral::new("d1"), -30.0, adv());
        settle().await;

        match rx1.try_recv() {
            Ok(ScanEvent::Snapshot(snap)) => {
                let history = snap.get(&"d1".into()).unwrap();
                assert_eq!(history.len(), 2);
                assert_eq!(history[0].rssi, -30.0, "newest first");
                assert_eq!(history[1].rssi, -60.0);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_request_is_pass_through() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;
        scanner.connect(Peripheral::new("d1")).await.unwrap();
        scanner.disconnect(Peripheral::new("d1")).await.unwrap();
        settle().await;

        let calls = driver.calls();
        assert!(calls.contains(&DriverCall::Connect("d1".into())));
        assert!(calls.contains(&DriverCall::Disconnect("d1".into())));
        // Requests alone never produce listener events or table entries.
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_connect_confirmed_spawns_once() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().connected(Peripheral::new("d1"));
        driver.sink().connected(Peripheral::new("d1"));
        settle().await;

        assert!(matches!(
            rx1.try_recv(),
            Ok(ScanEvent::PeripheralConnected { .. })
        ));
        assert!(rx1.try_recv().is_err(), "second confirmation must be a no-op");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_disconnect_still_broadcasts() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().disconnected(Peripheral::new("ghost"), None);
        settle().await;

        match rx1.try_recv() {
            Ok(ScanEvent::PeripheralDisconnected { peripheral, reason }) => {
                assert_eq!(peripheral.id, "ghost".into());
                assert!(reason.is_none());
            }
            other => panic!("expected disconnect event, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_then_disconnect_lifecycle() {
        // One spawn, one removal, two broadcasts in order.
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver.sink().connected(Peripheral::new("d1"));
        driver.sink().disconnected(Peripheral::new("d1"), None);
        settle().await;

        let session = match rx1.try_recv() {
            Ok(ScanEvent::PeripheralConnected { peripheral, session }) => {
                assert_eq!(peripheral.id, "d1".into());
                session
            }
            other => panic!("expected connected event, got {other:?}"),
        };
        assert!(matches!(
            rx1.try_recv(),
            Ok(ScanEvent::PeripheralDisconnected { .. })
        ));

        // The session actor was told to terminate.
        settle().await;
        assert!(session.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_connect_takes_disconnect_path() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;

        driver
            .sink()
            .failed_to_connect(Peripheral::new("d1"), Some("connection refused".into()));
        settle().await;

        match rx1.try_recv() {
            Ok(ScanEvent::PeripheralDisconnected { reason, .. }) => {
                assert_eq!(reason.as_deref(), Some("connection refused"));
            }
            other => panic!("expected disconnect event, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_discovery_after_stop_is_recorded() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;
        scanner.stop_scanning().await.unwrap();
        settle().await;

        // A discovery that was already on the wire when the scan stopped.
        driver.sink().discovered(Peripheral::new("d1"), -60.0, adv());
        settle().await;

        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::Snapshot(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_clears_history() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;
        driver.sink().discovered(Peripheral::new("d1"), -60.0, adv());
        settle().await;
        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::Snapshot(_))));

        scanner.purge_observations().await.unwrap();
        settle().await;

        time::sleep(Duration::from_millis(1100)).await;
        driver.sink().discovered(Peripheral::new("d2"), -50.0, adv());
        settle().await;

        match rx1.try_recv() {
            Ok(ScanEvent::Snapshot(snap)) => {
                assert!(!snap.contains_key(&"d1".into()), "purged history resurfaced");
                assert!(snap.contains_key(&"d2".into()));
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_listener_stops_receiving() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, mut rx1) = listener_channel(16);

        scanner.add_listener(l1.clone()).await.unwrap();
        scanner.remove_listener(l1.id()).await.unwrap();
        settle().await;

        driver.sink().power_changed(true);
        settle().await;
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminate_detaches_and_closes_mailbox() {
        let driver = MockDriver::arc();
        let scanner = CentralScanner::spawn(Config::default(), driver.clone());
        let (l1, _rx1) = listener_channel(16);

        scanner.start_scanning(None, l1).await.unwrap();
        settle().await;
        let sink = driver.sink();

        scanner.terminate().await.unwrap();
        settle().await;

        assert!(driver.calls().contains(&DriverCall::Detach));
        assert!(sink.is_detached());
        assert!(scanner.is_closed());
        assert!(matches!(
            scanner.stop_scanning().await,
            Err(ScannerError::MailboxClosed)
        ));
    }
}
