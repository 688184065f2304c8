use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::FetchError,
    station_state::{StateCache, StationState},
    tasmota::{models::DeviceSnapshot, TasmotaClient},
};

use super::StatusSource;

/// Keeps the latest status of one device fresh in the background.
///
/// The polling task starts on construction and is the only writer of the
/// state; every read method is synchronous and never fails. Dropping the
/// station cancels the task.
#[derive(Debug)]
pub struct PollingStation {
    cache: StateCache,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    _task_guard: DropGuard,
}

impl PollingStation {
    /// Poll the Tasmota device at `address` with the default cadence and timeout.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(address: impl Into<String>) -> Self {
        Self::from_config(&Config::for_address(address))
    }

    pub fn from_config(config: &Config) -> Self {
        info!(
            address = %config.tasmota_address,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
            "Starting polling station"
        );
        let client = TasmotaClient::new(&config.tasmota_address, config.fetch_timeout);
        Self::spawn(client, config.poll_interval)
    }

    /// Start polling `source` every `interval`, first poll immediately.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero or if called outside a Tokio runtime.
    pub fn spawn<S: StatusSource + 'static>(source: S, interval: Duration) -> Self {
        let cache = StateCache::new();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(source, interval, cache.clone(), cancel.clone()));

        Self {
            cache,
            _task_guard: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    /// Online flag and last good snapshot, taken from the same update.
    pub fn snapshot(&self) -> StationState {
        self.cache.snapshot()
    }

    /// Receiver that is notified after every poll cycle.
    pub fn subscribe(&self) -> watch::Receiver<StationState> {
        self.cache.subscribe()
    }

    /// Ask the polling task to finish. Returns immediately.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("Stopping polling station");
            self.cancel.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop and wait for the polling task to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Polling task did not exit cleanly");
        }
    }

    pub fn online(&self) -> bool {
        self.cache.read(|state| state.online)
    }

    pub fn timestamp(&self) -> Option<String> {
        self.latest(|s| s.timestamp.clone())
    }

    pub fn voltage(&self) -> Option<i64> {
        self.latest(|s| s.voltage)
    }

    pub fn current(&self) -> Option<f64> {
        self.latest(|s| s.current)
    }

    pub fn power(&self) -> Option<i64> {
        self.latest(|s| s.power)
    }

    pub fn apparent_power(&self) -> Option<i64> {
        self.latest(|s| s.apparent_power)
    }

    pub fn reactive_power(&self) -> Option<i64> {
        self.latest(|s| s.reactive_power)
    }

    pub fn power_factor(&self) -> Option<f64> {
        self.latest(|s| s.power_factor)
    }

    pub fn power_today(&self) -> Option<f64> {
        self.latest(|s| s.power_today)
    }

    pub fn power_yesterday(&self) -> Option<f64> {
        self.latest(|s| s.power_yesterday)
    }

    fn latest<T>(&self, field: impl FnOnce(&DeviceSnapshot) -> T) -> Option<T> {
        self.cache.read(|state| state.latest.as_ref().map(field))
    }
}

/// The polling loop. Runs until `cancel` fires; fetch errors never end it.
async fn run<S: StatusSource>(
    source: S,
    interval: Duration,
    cache: StateCache,
    cancel: CancellationToken,
) {
    info!(interval_ms = interval.as_millis() as u64, "Polling loop started");
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // An in-flight request is abandoned on stop.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = source.fetch() => outcome,
        };

        record_outcome(&cache, outcome);
    }

    info!("Polling loop stopped");
}

fn record_outcome(cache: &StateCache, outcome: Result<DeviceSnapshot, FetchError>) {
    let was_online = cache.read(|state| state.online);

    match outcome {
        Ok(snapshot) => {
            debug!(
                timestamp = %snapshot.timestamp,
                power = snapshot.power,
                voltage = snapshot.voltage,
                "Status poll succeeded"
            );
            cache.record(Ok(snapshot));
            if !was_online {
                info!("Device is online");
            }
        }
        Err(e) => {
            cache.record(Err(&e));
            if was_online {
                warn!(error = %e, "Device went offline");
            } else {
                debug!(error = %e, "Status poll failed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
