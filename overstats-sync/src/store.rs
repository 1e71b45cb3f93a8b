use std::future::Future;

use overstats_database::{
    Database,
    impls::{
        changes::{FeedItem, UserChangeListener, listen_user_changes},
        users,
    },
    model::{
        changes::ChangeEvent,
        profile::ProfileSnapshot,
        region::{Platform, Region},
        users::{RankedEntry, RefreshTarget, UserRecord, WriteResult},
    },
};

use crate::error::StoreError;
use crate::rank::FieldPath;

/// Partition of the population that takes part in a ranking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    All,
    Platform(Platform),
}

impl Scope {
    /// Regions in scope, or `None` for everyone.
    pub fn regions(self) -> Option<Vec<Region>> {
        match self {
            Scope::All => None,
            Scope::Platform(platform) => Some(platform.regions()),
        }
    }

    pub fn contains(self, region: Region) -> bool {
        match self {
            Scope::All => true,
            Scope::Platform(platform) => region.platform() == platform,
        }
    }
}

/// Storage capability the engine runs against.
///
/// Each call is a single round trip; the store owns its own per-record
/// atomicity and the engine never holds anything across calls.
pub trait ProfileStore: Send + Sync {
    type Feed: ChangeFeed;

    fn get_user(&self, user_id: u64)
    -> impl Future<Output = Result<UserRecord, StoreError>> + Send;

    /// Replace only the profile of `user_id`, leaving identity fields alone.
    fn update_profile(
        &self,
        user_id: u64,
        profile: &ProfileSnapshot,
    ) -> impl Future<Output = Result<WriteResult, StoreError>> + Send;

    fn list_refresh_targets(
        &self,
        stale_before: Option<u64>,
    ) -> impl Future<Output = Result<Vec<RefreshTarget>, StoreError>> + Send;

    /// Scoped population with a numeric value at `field`, highest value first
    /// and ties by ascending user id.
    fn query_ordered(
        &self,
        scope: Scope,
        field: &FieldPath,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<RankedEntry>, StoreError>> + Send;

    fn subscribe(&self) -> impl Future<Output = Result<Self::Feed, StoreError>> + Send;
}

/// Ordered stream of change events from one subscription.
pub trait ChangeFeed: Send {
    /// Next event in store emission order. `Ok(None)` means the feed ended;
    /// an error means the subscription is broken. Either way the caller must
    /// subscribe again to keep receiving events.
    fn next_event(&mut self)
    -> impl Future<Output = Result<Option<ChangeEvent>, StoreError>> + Send;
}

impl ProfileStore for Database {
    type Feed = UserChangeListener;

    async fn get_user(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        users::get_user(self, user_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: u64,
        profile: &ProfileSnapshot,
    ) -> Result<WriteResult, StoreError> {
        Ok(users::update_profile(self, user_id, profile).await?)
    }

    async fn list_refresh_targets(
        &self,
        stale_before: Option<u64>,
    ) -> Result<Vec<RefreshTarget>, StoreError> {
        Ok(users::list_refresh_targets(self, stale_before).await?)
    }

    async fn query_ordered(
        &self,
        scope: Scope,
        field: &FieldPath,
        limit: Option<u32>,
    ) -> Result<Vec<RankedEntry>, StoreError> {
        let regions = scope.regions();
        Ok(users::query_ordered(self, regions.as_deref(), field.segments(), limit).await?)
    }

    async fn subscribe(&self) -> Result<UserChangeListener, StoreError> {
        Ok(listen_user_changes(self).await?)
    }
}

impl ChangeFeed for UserChangeListener {
    async fn next_event(&mut self) -> Result<Option<ChangeEvent>, StoreError> {
        loop {
            if let Some(result) = feed_result(self.next_change().await?) {
                return result;
            }
        }
    }
}

/// `None` asks for another receive. A lost connection breaks the
/// subscription so the owner re-subscribes and the queued backlog is cleared.
fn feed_result(item: FeedItem) -> Option<Result<Option<ChangeEvent>, StoreError>> {
    match item {
        FeedItem::Change(event) => Some(Ok(Some(event))),
        FeedItem::Skipped => None,
        FeedItem::Disconnected => Some(Err(StoreError::Unavailable(anyhow::anyhow!(
            "change feed connection lost"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use overstats_database::impls::changes::FeedItem;
    use overstats_database::model::{
        changes::ChangeEvent,
        region::{Platform, Region},
    };

    use super::{Scope, feed_result};
    use crate::error::StoreError;
    use crate::testing::registered;

    #[test]
    fn feed_items_map_to_events() {
        let event = ChangeEvent {
            old: None,
            new: Some(registered(1, Region::Eu, Some(2500), 10)),
        };
        assert!(matches!(
            feed_result(FeedItem::Change(event.clone())),
            Some(Ok(Some(ref got))) if *got == event
        ));
        assert!(feed_result(FeedItem::Skipped).is_none());
    }

    #[test]
    fn lost_connection_breaks_the_subscription() {
        assert!(matches!(
            feed_result(FeedItem::Disconnected),
            Some(Err(StoreError::Unavailable(_)))
        ));
    }

    #[test]
    fn scope_membership() {
        assert!(Scope::All.contains(Region::Xbl));
        assert!(Scope::Platform(Platform::Console).contains(Region::Psn));
        assert!(!Scope::Platform(Platform::Console).contains(Region::Kr));
        assert_eq!(Scope::All.regions(), None);
        assert_eq!(
            Scope::Platform(Platform::Pc).regions(),
            Some(vec![Region::Eu, Region::Us, Region::Kr])
        );
    }
}
