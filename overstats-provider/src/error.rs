//! Stats provider error types.

use thiserror::Error;

/// Errors returned when fetching a profile from the stats API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API has no profile for this region and handle.
    #[error("profile not found")]
    NotFound,

    /// The upstream rejected the request or could not be reached; retrying
    /// on a later cycle may succeed.
    #[error("stats api request failed: {0}")]
    Transient(String),

    /// The response body was not a JSON document.
    #[error("stats api returned an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transient(e.to_string())
    }
}
