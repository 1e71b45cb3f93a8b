use std::future::Future;

use overstats_database::model::users::UserRecord;

use crate::report::SessionReport;

/// Where a session report is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationTarget {
    Channel(u64),
    DirectMessage(u64),
}

impl NotificationTarget {
    /// The user's configured channel, falling back to a direct message.
    pub fn for_user(record: &UserRecord) -> Self {
        match record.notify_channel_id {
            Some(channel_id) => Self::Channel(channel_id),
            None => Self::DirectMessage(record.id),
        }
    }
}

/// Best-effort delivery of session reports. Failures are logged by the caller
/// and never retried.
pub trait Notifier: Send + Sync {
    fn deliver(
        &self,
        target: NotificationTarget,
        report: &SessionReport,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}
