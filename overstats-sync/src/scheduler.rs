use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::provider::ProfileProvider;
use crate::refresher::{BatchRefresher, log_summary};
use crate::store::ProfileStore;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Run `refresh_all` every `period`, forever.
///
/// The first cycle starts immediately. A cycle that overruns the period
/// delays the next tick instead of overlapping it, and a failed cycle is
/// logged without stopping the schedule.
pub async fn run_refresh_scheduler<P, S>(refresher: BatchRefresher<P, S>, period: Duration)
where
    P: ProfileProvider + 'static,
    S: ProfileStore + 'static,
{
    info!(
        period_secs = period.as_secs(),
        group_size = refresher.settings().group_size,
        "profile refresh scheduler started"
    );

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let started = Instant::now();
        match refresher.refresh_all().await {
            Ok(summary) => log_summary(&summary, started.elapsed()),
            Err(err) => warn!(error = %err, "profile refresh cycle failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use overstats_database::model::region::Region;

    use super::run_refresh_scheduler;
    use crate::refresher::{BatchRefresher, RefreshSettings};
    use crate::testing::{MemoryStore, ScriptedProvider, registered};

    #[tokio::test]
    async fn keeps_ticking_after_a_failed_cycle() {
        let store = Arc::new(MemoryStore::default());
        let provider = Arc::new(ScriptedProvider::default());
        store.insert(registered(1, Region::Eu, Some(2000), 1));
        provider.set_profile("player-1", 2100, 2);
        store.set_unavailable(true);

        let refresher = BatchRefresher::new(
            Arc::clone(&provider),
            Arc::clone(&store),
            RefreshSettings::default(),
        );
        let scheduler = tokio::spawn(run_refresh_scheduler(refresher, Duration::from_millis(20)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        store.set_unavailable(false);
        for _ in 0..200 {
            let refreshed = store
                .record(1)
                .and_then(|record| record.profile)
                .is_some_and(|profile| profile.rating() == 2100);
            if refreshed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        scheduler.abort();

        assert!(provider.calls.load(Ordering::SeqCst) > 0);
        assert_eq!(store.record(1).unwrap().profile.unwrap().rating(), 2100);
    }
}
