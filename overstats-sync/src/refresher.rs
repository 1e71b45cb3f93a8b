use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use overstats_database::{impls::users::now_unix_secs, model::users::RefreshTarget};

use crate::error::{FetchError, StoreError};
use crate::provider::ProfileProvider;
use crate::store::ProfileStore;

pub const DEFAULT_GROUP_SIZE: usize = 50;
pub const DEFAULT_MEMBER_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Debug)]
pub struct RefreshSettings {
    /// Upper bound on concurrent fetches; groups run one after another.
    pub group_size: usize,
    /// Budget for one member's fetch before it is abandoned.
    pub member_timeout: Duration,
    /// Only refresh profiles older than this. `None` refreshes everyone.
    pub stale_after: Option<Duration>,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            member_timeout: DEFAULT_MEMBER_TIMEOUT,
            stale_after: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub targets: usize,
    pub groups: usize,
    pub updated: usize,
    pub failed: usize,
}

enum MemberOutcome {
    Updated,
    Failed,
}

/// Re-fetches registered profiles and writes them back in bounded groups.
pub struct BatchRefresher<P, S> {
    provider: Arc<P>,
    store: Arc<S>,
    settings: RefreshSettings,
}

impl<P, S> BatchRefresher<P, S>
where
    P: ProfileProvider + 'static,
    S: ProfileStore + 'static,
{
    pub fn new(provider: Arc<P>, store: Arc<S>, settings: RefreshSettings) -> Self {
        Self {
            provider,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Refresh every user that needs it.
    ///
    /// Members of a group are fetched concurrently and the whole group is
    /// awaited before the next one starts. Member failures are logged and
    /// counted; only a failure to list the targets fails the cycle.
    pub async fn refresh_all(&self) -> Result<RefreshSummary, StoreError> {
        let stale_before = self
            .settings
            .stale_after
            .map(|age| now_unix_secs().saturating_sub(age.as_secs()));
        let targets = self.store.list_refresh_targets(stale_before).await?;

        let group_size = self.settings.group_size.max(1);
        let mut summary = RefreshSummary {
            targets: targets.len(),
            ..RefreshSummary::default()
        };

        for (index, group) in targets.chunks(group_size).enumerate() {
            debug!(group = index, members = group.len(), "refreshing profile group");
            summary.groups += 1;

            let mut members = JoinSet::new();
            for target in group.iter().cloned() {
                let provider = Arc::clone(&self.provider);
                let store = Arc::clone(&self.store);
                let timeout = self.settings.member_timeout;
                members.spawn(async move {
                    refresh_member(provider.as_ref(), store.as_ref(), target, timeout).await
                });
            }

            while let Some(joined) = members.join_next().await {
                match joined {
                    Ok(MemberOutcome::Updated) => summary.updated += 1,
                    Ok(MemberOutcome::Failed) => summary.failed += 1,
                    Err(source) => {
                        error!(?source, "profile refresh task panicked");
                        summary.failed += 1;
                    }
                }
            }
        }

        Ok(summary)
    }
}

async fn refresh_member<P, S>(
    provider: &P,
    store: &S,
    target: RefreshTarget,
    timeout: Duration,
) -> MemberOutcome
where
    P: ProfileProvider,
    S: ProfileStore,
{
    let fetch = provider.fetch(target.region, &target.handle);
    let fetched = match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::TimedOut(timeout)),
    };

    let profile = match fetched {
        Ok(profile) => profile,
        Err(err) => {
            warn!(
                error = %err,
                user_id = target.id,
                region = %target.region,
                handle = %target.handle,
                "failed to fetch profile"
            );
            return MemberOutcome::Failed;
        }
    };

    match store.update_profile(target.id, &profile).await {
        Ok(result) if result.matched => {
            debug!(
                user_id = target.id,
                region = %target.region,
                handle = %target.handle,
                changed = result.changed,
                "profile updated"
            );
            MemberOutcome::Updated
        }
        Ok(_) => {
            warn!(user_id = target.id, "user disappeared before profile write");
            MemberOutcome::Failed
        }
        Err(err) => {
            warn!(error = %err, user_id = target.id, "failed to store profile");
            MemberOutcome::Failed
        }
    }
}

/// Log line for a finished cycle.
pub(crate) fn log_summary(summary: &RefreshSummary, elapsed: Duration) {
    info!(
        targets = summary.targets,
        groups = summary.groups,
        updated = summary.updated,
        failed = summary.failed,
        elapsed_ms = elapsed.as_millis() as u64,
        "profile refresh cycle finished"
    );
}
