use std::future::Future;

use overstats_database::model::{profile::ProfileSnapshot, region::Region};
use overstats_provider::OvrstatClient;

use crate::error::FetchError;

/// Source of fresh profile snapshots.
pub trait ProfileProvider: Send + Sync {
    fn fetch(
        &self,
        region: Region,
        handle: &str,
    ) -> impl Future<Output = Result<ProfileSnapshot, FetchError>> + Send;
}

impl ProfileProvider for OvrstatClient {
    async fn fetch(&self, region: Region, handle: &str) -> Result<ProfileSnapshot, FetchError> {
        Ok(self.fetch_profile(region, handle).await?)
    }
}
