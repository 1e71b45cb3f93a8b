//! In-memory stand-ins for the store, provider and notifier.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use overstats_database::impls::users::now_unix_secs;
use overstats_database::model::{
    changes::ChangeEvent,
    profile::ProfileSnapshot,
    region::Region,
    users::{RankedEntry, RefreshTarget, UserRecord, WriteResult},
};

use crate::error::{FetchError, StoreError};
use crate::notifier::{NotificationTarget, Notifier};
use crate::provider::ProfileProvider;
use crate::rank::FieldPath;
use crate::report::SessionReport;
use crate::store::{ChangeFeed, ProfileStore, Scope};

pub fn stats_profile(
    rating: i64,
    games: i64,
    wins: i64,
    ties: i64,
    losses: i64,
) -> ProfileSnapshot {
    ProfileSnapshot::new(json!({
        "name": "Tester#1234",
        "rating": rating,
        "prestige": 0,
        "level": 25,
        "competitiveStats": {
            "careerStats": {
                "allHeroes": {
                    "game": { "gamesPlayed": games, "gamesWon": wins },
                    "miscellaneous": { "gamesTied": ties, "gamesLost": losses }
                }
            }
        }
    }))
}

pub fn registered(id: u64, region: Region, rating: Option<i64>, games: i64) -> UserRecord {
    UserRecord {
        id,
        handle: format!("player-{id}"),
        region,
        notify_channel_id: None,
        profile: rating.map(|rating| stats_profile(rating, games, 0, 0, 0)),
        registered_at: 0,
        profile_updated_at: None,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<u64, UserRecord>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Option<ChangeEvent>>>>,
    unavailable: AtomicBool,
    pub subscriptions: AtomicUsize,
}

impl MemoryStore {
    pub fn insert(&self, record: UserRecord) {
        let old = self
            .users
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        self.emit(ChangeEvent {
            old,
            new: Some(record),
        });
    }

    pub fn record(&self, id: u64) -> Option<UserRecord> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn emit(&self, event: ChangeEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|sender| sender.send(Some(event.clone())).is_ok());
    }

    /// Break every open feed with an error, as a lost connection would.
    pub fn drop_connections(&self) {
        for sender in self.subscribers.lock().unwrap().drain(..) {
            let _ = sender.send(None);
        }
    }

    /// End every open feed, as a dropped connection would.
    pub fn close_feeds(&self) {
        self.subscribers.lock().unwrap().clear();
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(anyhow::anyhow!("memory store offline")));
        }
        Ok(())
    }
}

pub struct MemoryFeed {
    receiver: mpsc::UnboundedReceiver<Option<ChangeEvent>>,
}

impl ChangeFeed for MemoryFeed {
    async fn next_event(&mut self) -> Result<Option<ChangeEvent>, StoreError> {
        match self.receiver.recv().await {
            Some(Some(event)) => Ok(Some(event)),
            Some(None) => Err(StoreError::Unavailable(anyhow::anyhow!("memory feed lost"))),
            None => Ok(None),
        }
    }
}

impl ProfileStore for MemoryStore {
    type Feed = MemoryFeed;

    async fn get_user(&self, user_id: u64) -> Result<UserRecord, StoreError> {
        self.check_available()?;
        self.record(user_id).ok_or(StoreError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: u64,
        profile: &ProfileSnapshot,
    ) -> Result<WriteResult, StoreError> {
        self.check_available()?;

        let event = {
            let mut users = self.users.lock().unwrap();
            let Some(record) = users.get_mut(&user_id) else {
                return Ok(WriteResult::default());
            };
            let old = record.clone();
            record.profile = Some(profile.clone());
            record.profile_updated_at = Some(now_unix_secs());
            ChangeEvent {
                old: Some(old),
                new: Some(record.clone()),
            }
        };

        let changed = event.old.as_ref().and_then(|old| old.profile.as_ref()) != Some(profile);
        self.emit(event);

        Ok(WriteResult {
            matched: true,
            inserted: false,
            changed,
        })
    }

    async fn list_refresh_targets(
        &self,
        stale_before: Option<u64>,
    ) -> Result<Vec<RefreshTarget>, StoreError> {
        self.check_available()?;

        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|record| match (stale_before, record.profile_updated_at) {
                (None, _) | (Some(_), None) => true,
                (Some(cutoff), Some(updated)) => updated < cutoff,
            })
            .map(|record| RefreshTarget {
                id: record.id,
                handle: record.handle.clone(),
                region: record.region,
            })
            .collect())
    }

    async fn query_ordered(
        &self,
        scope: Scope,
        field: &FieldPath,
        limit: Option<u32>,
    ) -> Result<Vec<RankedEntry>, StoreError> {
        self.check_available()?;

        let mut entries = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|record| scope.contains(record.region))
            .filter_map(|record| {
                let value = record.profile.as_ref()?.number_at(field.segments())?;
                Some(RankedEntry {
                    user_id: record.id,
                    handle: record.handle.clone(),
                    region: record.region,
                    value,
                })
            })
            .collect::<Vec<_>>();

        entries.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }

        Ok(entries)
    }

    async fn subscribe(&self) -> Result<MemoryFeed, StoreError> {
        self.check_available()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(sender);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryFeed { receiver })
    }
}

/// Provider returning canned profiles by handle, with optional latency and
/// handles that never answer.
#[derive(Default)]
pub struct ScriptedProvider {
    profiles: Mutex<HashMap<String, ProfileSnapshot>>,
    hanging: Mutex<HashSet<String>>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    timeline: Mutex<Vec<FetchMark>>,
}

/// One entry of the provider's fetch timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchMark {
    Started(String),
    Finished(String),
}

impl ScriptedProvider {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn set_profile(&self, handle: &str, rating: i64, games: i64) {
        self.profiles
            .lock()
            .unwrap()
            .insert(handle.to_owned(), stats_profile(rating, games, 0, 0, 0));
    }

    pub fn set_snapshot(&self, handle: &str, snapshot: ProfileSnapshot) {
        self.profiles
            .lock()
            .unwrap()
            .insert(handle.to_owned(), snapshot);
    }

    pub fn hang(&self, handle: &str) {
        self.hanging.lock().unwrap().insert(handle.to_owned());
    }

    /// Fetch starts and finishes in the order they happened. A fetch that
    /// was abandoned counts as finished when it is dropped.
    pub fn timeline(&self) -> Vec<FetchMark> {
        self.timeline.lock().unwrap().clone()
    }
}

struct InFlight<'a> {
    provider: &'a ScriptedProvider,
    handle: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.provider
            .timeline
            .lock()
            .unwrap()
            .push(FetchMark::Finished(self.handle.to_owned()));
        self.provider.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProfileProvider for ScriptedProvider {
    async fn fetch(&self, _region: Region, handle: &str) -> Result<ProfileSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.timeline
            .lock()
            .unwrap()
            .push(FetchMark::Started(handle.to_owned()));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight {
            provider: self,
            handle,
        };

        let hangs = self.hanging.lock().unwrap().contains(handle);
        if hangs {
            std::future::pending::<()>().await;
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let profile = self.profiles.lock().unwrap().get(handle).cloned();
        profile.ok_or(FetchError::NotFound)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(NotificationTarget, SessionReport)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<(NotificationTarget, SessionReport)> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn deliver(
        &self,
        target: NotificationTarget,
        report: &SessionReport,
    ) -> anyhow::Result<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push((target, report.clone()));

        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("notifier offline");
        }
        Ok(())
    }
}
