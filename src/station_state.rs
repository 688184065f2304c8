use std::sync::Arc;

use tokio::sync::watch;

use crate::{error::FetchError, tasmota::models::DeviceSnapshot};

/// What readers see: the online flag plus the last good snapshot.
///
/// A failed poll keeps the previous `latest` and only clears `online`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationState {
    pub online: bool,
    pub latest: Option<DeviceSnapshot>,
}

impl StationState {
    /// Fold one poll outcome into the state and return the new `online` flag.
    pub fn record(&mut self, outcome: Result<DeviceSnapshot, &FetchError>) -> bool {
        match outcome {
            Ok(snapshot) => {
                self.latest = Some(snapshot);
                self.online = true;
            }
            Err(_) => self.online = false,
        }
        self.online
    }
}

/// Holder of the current [`StationState`].
///
/// Wrapped in `Arc` so the polling task and the station share one channel.
/// The whole state is replaced under the channel lock, so a reader never
/// observes half of an update.
#[derive(Debug, Clone)]
pub struct StateCache {
    inner: Arc<watch::Sender<StationState>>,
}

impl Default for StateCache {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(StationState::default());
        Self { inner: Arc::new(tx) }
    }
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one poll outcome. Only the polling task calls this.
    pub(crate) fn record(&self, outcome: Result<DeviceSnapshot, &FetchError>) -> bool {
        let mut online = false;
        self.inner.send_modify(|state| online = state.record(outcome));
        online
    }

    /// Run `f` against the current state without cloning it.
    ///
    /// Holds the channel's read lock for the duration of `f`; keep it short.
    pub fn read<T>(&self, f: impl FnOnce(&StationState) -> T) -> T {
        f(&self.inner.borrow())
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> StationState {
        self.inner.borrow().clone()
    }

    /// Receiver notified after every recorded outcome.
    pub fn subscribe(&self) -> watch::Receiver<StationState> {
        self.inner.subscribe()
    }
}
