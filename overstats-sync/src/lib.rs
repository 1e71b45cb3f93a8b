//! Profile synchronization and change-driven reporting.
//!
//! The refresher and the change consumer are independent long-running tasks
//! that only communicate through the [`ProfileStore`]; rank queries read the
//! same store on demand.

pub mod consumer;
pub mod error;
pub mod notifier;
pub mod provider;
pub mod rank;
pub mod refresher;
pub mod report;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod testing;

pub use consumer::{ChangeConsumer, DEFAULT_RESTART_DELAY, EventOutcome};
pub use error::{FetchError, StoreError};
pub use notifier::{NotificationTarget, Notifier};
pub use provider::ProfileProvider;
pub use rank::{FieldPath, RankResult, rank, top};
pub use refresher::{BatchRefresher, RefreshSettings, RefreshSummary};
pub use report::{FieldChange, Report, SessionReport};
pub use scheduler::{DEFAULT_REFRESH_INTERVAL, run_refresh_scheduler};
pub use store::{ChangeFeed, ProfileStore, Scope};
