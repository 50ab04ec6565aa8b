//! # Discovery data model: device identities and observation samples.
//!
//! A peripheral is identified by a stable, opaque [`DeviceId`]. Every time
//! the hardware driver reports a discovery, the sink adapter wraps it into
//! one immutable [`Observation`] carrying the signal strength, the raw
//! advertisement payload, and the sample timestamp.
//!
//! Identity types are thin `Arc<str>` newtypes: cheap to clone across the
//! mailbox and hashable as map keys.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Stable, opaque identity of a physical peripheral (UUID string or similar).
///
/// Immutable once observed; used as the key of the observation history and
/// the connection table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceId(Arc<str>);

impl DeviceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity of an advertised service, used in scan filters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUuid(Arc<str>);

impl ServiceUuid {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceUuid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Services to restrict a scan to. `None` at the call sites means "scan for
/// everything".
pub type ScanFilter = Vec<ServiceUuid>;

/// Cloneable handle to a remote peripheral.
///
/// This is what driver events carry and what a session actor receives as
/// its initial configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peripheral {
    /// Stable identity.
    pub id: DeviceId,
    /// Advertised local name, when the advertisement included one.
    pub local_name: Option<Arc<str>>,
}

impl Peripheral {
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            local_name: None,
        }
    }

    pub fn with_local_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.local_name = Some(name.into());
        self
    }
}

impl From<&str> for Peripheral {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Raw advertisement payload, treated as an opaque key/value map.
///
/// Shared behind an `Arc` so that history entries and snapshots never copy
/// payload bytes.
pub type AdvertisementData = Arc<HashMap<String, Vec<u8>>>;

/// One timestamped discovery sample. Immutable once created.
#[derive(Clone, Debug)]
pub struct Observation {
    /// The observed peripheral.
    pub peripheral: Peripheral,
    /// Received signal strength at sample time (dBm-style, typically negative).
    pub rssi: f64,
    /// Raw advertisement payload.
    pub advertisement: AdvertisementData,
    /// Monotonic sample timestamp.
    pub at: Instant,
}

impl Observation {
    pub fn new(
        peripheral: Peripheral,
        rssi: f64,
        advertisement: AdvertisementData,
        at: Instant,
    ) -> Self {
        Self {
            peripheral,
            rssi,
            advertisement,
            at,
        }
    }

    /// Convenience: the device identity this sample belongs to.
    pub fn device(&self) -> &DeviceId {
        &self.peripheral.id
    }
}

/// Full observation history shipped to listeners: device → samples, newest
/// first. Arc'd so fan-out clones are cheap.
pub type ObservationsSnapshot = Arc<HashMap<DeviceId, Vec<Observation>>>;
