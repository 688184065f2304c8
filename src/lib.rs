//! Background poller for Tasmota smart plugs with power monitoring.
//!
//! [`PollingStation`] queries a device's `Status 8` endpoint on a fixed
//! cadence and keeps the latest measurements readable from any thread.

pub mod config;
pub mod error;
pub mod polling;
pub mod station_state;
pub mod tasmota;

pub use crate::{
    config::Config,
    error::FetchError,
    polling::{PollingStation, StatusSource},
    station_state::StationState,
    tasmota::{fetch, models::DeviceSnapshot, TasmotaClient},
};
