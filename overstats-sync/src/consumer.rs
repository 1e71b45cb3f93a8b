use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use overstats_database::model::{changes::ChangeEvent, profile::StatCollection};

use crate::error::StoreError;
use crate::notifier::{NotificationTarget, Notifier};
use crate::report::{Report, SessionReport};
use crate::store::{ChangeFeed, ProfileStore};

pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);

/// What happened to one change event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// One side of the change had no profile to compare.
    MissingProfile,
    /// The user switched to another account; the two profiles are unrelated.
    AccountChanged,
    /// The games count did not move.
    NoSession,
    Delivered,
    DeliveryFailed,
}

/// Turns profile changes into session reports.
pub struct ChangeConsumer<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    collection: StatCollection,
}

impl<S, N> ChangeConsumer<S, N>
where
    S: ProfileStore,
    N: Notifier,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
            collection: StatCollection::Competitive,
        }
    }

    pub fn with_collection(mut self, collection: StatCollection) -> Self {
        self.collection = collection;
        self
    }

    /// Process one event: compare the two profiles and report a session when
    /// the games count changed.
    pub async fn handle_event(&self, event: ChangeEvent) -> EventOutcome {
        let (Some(old), Some(new)) = (event.old, event.new) else {
            return EventOutcome::MissingProfile;
        };
        let (Some(old_profile), Some(new_profile)) = (old.profile.as_ref(), new.profile.as_ref())
        else {
            return EventOutcome::MissingProfile;
        };

        if old.handle != new.handle || old.region != new.region {
            debug!(user_id = new.id, "account changed; not comparing profiles");
            return EventOutcome::AccountChanged;
        }

        let old_report = Report::extract(old_profile, self.collection);
        let new_report = Report::extract(new_profile, self.collection);
        let delta = new_report - old_report;

        if !delta.has_session() {
            debug!(user_id = new.id, "profile changed without a new session");
            return EventOutcome::NoSession;
        }

        let report = SessionReport::build(&new, self.collection, &old_report, &new_report);
        let target = NotificationTarget::for_user(&new);

        match self.notifier.deliver(target, &report).await {
            Ok(()) => {
                info!(
                    user_id = new.id,
                    games = delta.games,
                    rating = delta.rating,
                    "session report delivered"
                );
                EventOutcome::Delivered
            }
            Err(err) => {
                warn!(error = ?err, user_id = new.id, ?target, "failed to deliver session report");
                EventOutcome::DeliveryFailed
            }
        }
    }

    /// Consume one subscription until it ends or fails.
    ///
    /// Events are handled one at a time in emission order; a slow notifier
    /// delays everything behind it. Per-event problems never end the loop.
    pub async fn run(&self) -> Result<(), StoreError> {
        let mut feed = self.store.subscribe().await?;
        info!("change consumer subscribed");

        while let Some(event) = feed.next_event().await? {
            self.handle_event(event).await;
        }

        Ok(())
    }

    /// Keep a subscription alive for the life of the process, re-subscribing
    /// from scratch after `restart_delay` whenever it ends. Missed events are
    /// not replayed.
    pub async fn run_forever(&self, restart_delay: Duration) {
        loop {
            match self.run().await {
                Ok(()) => warn!("change feed ended; re-subscribing"),
                Err(err) => error!(error = %err, "change feed failed; re-subscribing"),
            }
            tokio::time::sleep(restart_delay).await;
        }
    }
}
