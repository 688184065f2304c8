use reqwest::StatusCode;
use thiserror::Error;

/// Why a single status fetch produced no snapshot.
///
/// The polling loop treats every variant the same way (the cycle failed);
/// the distinction only matters for logging and for one-shot callers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("device did not answer within the timeout")]
    Timeout,

    #[error("device returned HTTP {0}")]
    HttpStatus(StatusCode),

    #[error("failed to decode status envelope: {0}")]
    Decode(#[from] serde_json::Error),

    /// Connection refused, DNS failure, reset mid-response and friends.
    #[error("status request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e)
        }
    }
}
