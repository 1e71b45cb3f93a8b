//! Engine error types.

use std::time::Duration;

use thiserror::Error;

use overstats_provider::ProviderError;

/// Failure to obtain a fresh profile for one user.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No such profile upstream.
    #[error("profile not found")]
    NotFound,

    /// Network, rate-limit or upstream failure.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// The fetch did not finish within the per-member budget.
    #[error("profile fetch timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<ProviderError> for FetchError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound => Self::NotFound,
            ProviderError::Transient(message) => Self::Transient(message),
            ProviderError::Decode(source) => Self::Transient(source.to_string()),
        }
    }
}

/// Failure of a store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record (or ranked entry) does not exist.
    #[error("record not found")]
    NotFound,

    /// Connection-level failure. Fatal to the component holding the
    /// connection for the current cycle or subscription.
    #[error("store unavailable: {0:#}")]
    Unavailable(anyhow::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        Self::Unavailable(e)
    }
}
