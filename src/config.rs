use std::time::Duration;

use anyhow::{ensure, Context, Result};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 800;
pub const DEFAULT_DISPLAY_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Device host or `host:port`.
    pub tasmota_address: String,
    /// Time between the start of two polls.
    pub poll_interval: Duration,
    /// Per-request timeout; always shorter than `poll_interval`.
    pub fetch_timeout: Duration,
    /// How often the binary prints the current state.
    pub display_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::build(
            required("TASMOTA_ADDRESS")?,
            parse_millis(
                "POLL_INTERVAL_MS",
                &optional("POLL_INTERVAL_MS", &DEFAULT_POLL_INTERVAL_MS.to_string()),
            )?,
            parse_millis(
                "FETCH_TIMEOUT_MS",
                &optional("FETCH_TIMEOUT_MS", &DEFAULT_FETCH_TIMEOUT_MS.to_string()),
            )?,
            parse_millis(
                "DISPLAY_INTERVAL_MS",
                &optional("DISPLAY_INTERVAL_MS", &DEFAULT_DISPLAY_INTERVAL_MS.to_string()),
            )?,
        )
    }

    /// Defaults for everything except the address.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            tasmota_address: address.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            display_interval: Duration::from_millis(DEFAULT_DISPLAY_INTERVAL_MS),
        }
    }

    fn build(
        tasmota_address: String,
        poll_interval: Duration,
        fetch_timeout: Duration,
        display_interval: Duration,
    ) -> Result<Self> {
        let tasmota_address = tasmota_address.trim().to_owned();
        ensure!(!tasmota_address.is_empty(), "TASMOTA_ADDRESS must not be empty");
        ensure!(
            fetch_timeout < poll_interval,
            "FETCH_TIMEOUT_MS ({}) must be shorter than POLL_INTERVAL_MS ({})",
            fetch_timeout.as_millis(),
            poll_interval.as_millis(),
        );

        Ok(Self {
            tasmota_address,
            poll_interval,
            fetch_timeout,
            display_interval,
        })
    }
}

/// Parse a positive millisecond count from env var `key`.
fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a positive integer, got: {raw:?}"))?;
    ensure!(ms > 0, "{key} must be a positive integer, got: {raw:?}");
    Ok(Duration::from_millis(ms))
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
