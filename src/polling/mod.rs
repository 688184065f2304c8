mod service;

use async_trait::async_trait;

use crate::{error::FetchError, tasmota::models::DeviceSnapshot};

pub use service::PollingStation;

/// Anything that can produce one device snapshot per call.
///
/// [`crate::tasmota::TasmotaClient`] is the real implementation; the polling
/// loop only depends on this trait.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self) -> Result<DeviceSnapshot, FetchError>;
}
