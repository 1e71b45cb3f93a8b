use anyhow::Context as _;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use sqlx::types::Json;
use tracing::{debug, info, warn};

use crate::{
    database::Database,
    impls::users::UserRow,
    model::{changes::ChangeEvent, users::UserRecord},
};

/// NOTIFY channel the `record_user_change` trigger announces change ids on.
pub const USER_CHANGES_CHANNEL: &str = "user_changes";

/// Live subscription to the `users` change feed.
///
/// Notifications carry only the id of a `user_changes` row; the row is claimed
/// (deleted and returned) when the notification is received, so each change is
/// delivered to at most one listener.
pub struct UserChangeListener {
    listener: PgListener,
    pool: PgPool,
}

/// Subscribe to the change feed.
///
/// Changes recorded before the subscription started are discarded: a
/// re-subscription starts from the current state and never replays.
pub async fn listen_user_changes(db: &Database) -> anyhow::Result<UserChangeListener> {
    let mut listener = PgListener::connect_with(db.pool())
        .await
        .context("failed to open change feed connection")?;
    listener
        .listen(USER_CHANGES_CHANNEL)
        .await
        .context("failed to LISTEN on change feed channel")?;

    let discarded = sqlx::query("DELETE FROM user_changes")
        .execute(db.pool())
        .await?
        .rows_affected();
    info!(discarded, "subscribed to user change feed");

    Ok(UserChangeListener {
        listener,
        pool: db.pool().clone(),
    })
}

/// What one receive on the feed connection produced.
#[derive(Debug)]
pub enum FeedItem {
    Change(ChangeEvent),
    /// A notification whose row was already claimed or discarded, or whose
    /// payload was not a change id.
    Skipped,
    /// The connection dropped. Notifications sent meanwhile are gone and
    /// their rows stay queued until the next subscription clears them.
    Disconnected,
}

/// Meaning of a raw notification payload, `None` standing for a dropped
/// connection.
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    Change(i64),
    Malformed,
    Lost,
}

fn read_notice(payload: Option<&str>) -> Notice {
    match payload {
        None => Notice::Lost,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_or(Notice::Malformed, Notice::Change),
    }
}

impl UserChangeListener {
    /// Wait for the next item on the feed.
    ///
    /// Errors mean the connection could not be used at all.
    pub async fn next_change(&mut self) -> anyhow::Result<FeedItem> {
        let notification = self
            .listener
            .try_recv()
            .await
            .context("change feed connection failed")?;

        match read_notice(notification.as_ref().map(|n| n.payload())) {
            Notice::Lost => {
                warn!("change feed connection lost");
                Ok(FeedItem::Disconnected)
            }
            Notice::Malformed => {
                warn!(
                    payload = ?notification.as_ref().map(|n| n.payload()),
                    "ignoring malformed change notification"
                );
                Ok(FeedItem::Skipped)
            }
            Notice::Change(change_id) => Ok(claim_change(&self.pool, change_id)
                .await?
                .map_or(FeedItem::Skipped, FeedItem::Change)),
        }
    }
}

async fn claim_change(pool: &PgPool, change_id: i64) -> anyhow::Result<Option<ChangeEvent>> {
    let row: Option<(Option<Json<Value>>, Option<Json<Value>>)> =
        sqlx::query_as("DELETE FROM user_changes WHERE id = $1 RETURNING old_val, new_val")
            .bind(change_id)
            .fetch_optional(pool)
            .await?;

    let Some((old_val, new_val)) = row else {
        debug!(change_id, "change already claimed");
        return Ok(None);
    };

    Ok(Some(ChangeEvent {
        old: old_val.and_then(|Json(document)| decode_document(change_id, document)),
        new: new_val.and_then(|Json(document)| decode_document(change_id, document)),
    }))
}

/// Undecodable documents become an absent side rather than an error so one
/// bad row never stalls the feed.
fn decode_document(change_id: i64, document: Value) -> Option<UserRecord> {
    if document.is_null() {
        return None;
    }

    match serde_json::from_value::<UserRow>(document)
        .map_err(anyhow::Error::from)
        .and_then(UserRow::into_record)
    {
        Ok(record) => Some(record),
        Err(source) => {
            warn!(?source, change_id, "failed to decode change document");
            None
        }
    }
}
