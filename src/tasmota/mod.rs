pub mod models;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::{error::FetchError, polling::StatusSource};

use self::models::{DeviceSnapshot, StatusResponse};

/// Path and query of the `Status 8` (sensor status) command.
const STATUS_PATH: &str = "/cm?cmnd=Status%208";

/// Talks to one Tasmota device over its plaintext local HTTP API.
#[derive(Debug, Clone)]
pub struct TasmotaClient {
    http: Client,
    url: String,
    timeout: Duration,
}

impl TasmotaClient {
    /// `address` is a bare host (`192.168.178.104`) or `host:port`.
    pub fn new(address: &str, timeout: Duration) -> Self {
        // No idle pool: the socket of each fetch is closed when it completes.
        let http = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .expect("plain HTTP client always builds");

        Self {
            http,
            url: format!("http://{address}{STATUS_PATH}"),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one `Status 8` query and decode the full envelope.
    ///
    /// No retries: a failure is reported as is and the caller decides when
    /// to try again.
    pub async fn fetch_status(&self) -> Result<DeviceSnapshot, FetchError> {
        debug!(url = %self.url, "Fetching device status");

        let resp = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status));
        }

        let bytes = resp.bytes().await?;
        let envelope = serde_json::from_slice::<StatusResponse>(&bytes)?;

        Ok(envelope.into())
    }
}

#[async_trait]
impl StatusSource for TasmotaClient {
    async fn fetch(&self) -> Result<DeviceSnapshot, FetchError> {
        self.fetch_status().await
    }
}

/// One-shot status query against `address`, bounded by `timeout`.
pub async fn fetch(address: &str, timeout: Duration) -> Result<DeviceSnapshot, FetchError> {
    TasmotaClient::new(address, timeout).fetch_status().await
}
