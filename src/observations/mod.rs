//! Discovery samples and their per-device history.
//!
//! - [`Observation`], [`Peripheral`], [`DeviceId`] — the discovery data model
//! - [`ObservationStore`] — newest-first history with noise filtering

mod observation;
mod store;

pub use observation::{
    AdvertisementData, DeviceId, Observation, ObservationsSnapshot, Peripheral, ScanFilter,
    ServiceUuid,
};
pub use store::ObservationStore;
