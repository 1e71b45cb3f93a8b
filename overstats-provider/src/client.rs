use std::env;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::{StatusCode, Url};
use tracing::debug;

use overstats_database::model::{
    profile::ProfileSnapshot,
    region::{Platform, Region},
};

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://ovrstat.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for an ovrstat-compatible career stats API.
#[derive(Clone, Debug)]
pub struct OvrstatClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OvrstatClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid stats api base url `{base_url}`"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("stats api base url `{base_url}` cannot carry a path");
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("overstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build stats api http client")?;

        Ok(Self { http, base_url })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("OVRSTAT_BASE_URL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let timeout = env::var("OVRSTAT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Self::new(&base_url, timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the current career profile for `handle` on `region`.
    pub async fn fetch_profile(
        &self,
        region: Region,
        handle: &str,
    ) -> Result<ProfileSnapshot, ProviderError> {
        let url = profile_url(&self.base_url, region, handle);
        debug!(%url, "fetching profile");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(ProviderError::Transient(format!("unexpected status {status}")));
        }

        let body = response.bytes().await?;
        let document = serde_json::from_slice::<serde_json::Value>(&body)?;
        if !document.is_object() {
            return Err(ProviderError::Transient(
                "profile response is not a JSON object".to_owned(),
            ));
        }

        Ok(ProfileSnapshot::new(document))
    }
}

/// `{base}/stats/pc/{region}/{handle}` for PC regions and
/// `{base}/stats/{network}/{handle}` for consoles. Segments are percent-encoded.
pub fn profile_url(base_url: &Url, region: Region, handle: &str) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("stats");
        match region.platform() {
            Platform::Pc => {
                segments.push("pc").push(region.as_str());
            }
            Platform::Console => {
                segments.push(region.as_str());
            }
        }
        segments.push(handle);
    }
    url
}
