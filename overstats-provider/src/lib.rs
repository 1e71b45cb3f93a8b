mod client;
mod error;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OvrstatClient, profile_url};
pub use error::ProviderError;
