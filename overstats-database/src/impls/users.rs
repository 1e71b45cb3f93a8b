use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use serde::Deserialize;
use serde_json::Value;
use sqlx::types::Json;
use tracing::warn;

use crate::{
    cache::{USER_CACHE_TTL, invalidate_user, user_key},
    database::Database,
    model::{
        profile::ProfileSnapshot,
        region::Region,
        users::{NewRegistration, RankedEntry, RefreshTarget, UserRecord, WriteResult},
    },
};

/// Column layout shared by `SELECT * FROM users` rows and the `to_jsonb(row)`
/// documents written by the change-feed trigger.
#[derive(sqlx::FromRow, Deserialize)]
pub(crate) struct UserRow {
    id: i64,
    handle: String,
    region: String,
    notify_channel_id: Option<i64>,
    profile: Option<Value>,
    registered_at: i64,
    profile_updated_at: Option<i64>,
}

impl UserRow {
    pub(crate) fn into_record(self) -> anyhow::Result<UserRecord> {
        Ok(UserRecord {
            id: u64::try_from(self.id).context("id row out of u64 range")?,
            handle: self.handle,
            region: self.region.parse()?,
            notify_channel_id: self
                .notify_channel_id
                .map(u64::try_from)
                .transpose()
                .context("notify_channel_id row out of u64 range")?,
            profile: self
                .profile
                .filter(|document| !document.is_null())
                .map(ProfileSnapshot::new),
            registered_at: u64::try_from(self.registered_at)
                .context("registered_at row out of u64 range")?,
            profile_updated_at: self
                .profile_updated_at
                .map(u64::try_from)
                .transpose()
                .context("profile_updated_at row out of u64 range")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTargetRow {
    id: i64,
    handle: String,
    region: String,
}

#[derive(sqlx::FromRow)]
struct RankedRow {
    id: i64,
    handle: String,
    region: String,
    value: f64,
}

/// Fetch a user record, served from the cache when available.
pub async fn get_user(db: &Database, user_id: u64) -> anyhow::Result<Option<UserRecord>> {
    let cache_key = user_key(db.cache(), user_id);
    db.cache()
        .get_or_load_json(&cache_key, USER_CACHE_TTL, || async {
            let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

            let row: Option<UserRow> = sqlx::query_as(
                "SELECT id, handle, region, notify_channel_id, profile, registered_at, profile_updated_at
                 FROM users
                 WHERE id = $1",
            )
            .bind(user_id_i64)
            .fetch_optional(db.pool())
            .await?;

            row.map(UserRow::into_record).transpose()
        })
        .await
}

/// Create a user or replace its identity fields.
///
/// Re-saving the same handle and region leaves the stored profile alone, so
/// the registration path and the refresher never overwrite each other's
/// columns. Switching to another account replaces the profile with the one
/// fetched for it. The notification target and registration time of an
/// existing row are always kept.
pub async fn register_user(
    db: &Database,
    registration: &NewRegistration,
) -> anyhow::Result<WriteResult> {
    let user_id_i64 = i64::try_from(registration.id).context("user_id out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    let mut tx = db.pool().begin().await?;

    let previous: Option<(String, String)> =
        sqlx::query_as("SELECT handle, region FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id_i64)
            .fetch_optional(&mut *tx)
            .await?;

    sqlx::query(
        "INSERT INTO users (id, handle, region, profile, registered_at, profile_updated_at)
         VALUES ($1, $2, $3, $4, $5, $5)
         ON CONFLICT (id) DO UPDATE SET
            handle = EXCLUDED.handle,
            region = EXCLUDED.region,
            profile = CASE
                WHEN users.handle = EXCLUDED.handle AND users.region = EXCLUDED.region
                THEN users.profile
                ELSE EXCLUDED.profile
            END,
            profile_updated_at = CASE
                WHEN users.handle = EXCLUDED.handle AND users.region = EXCLUDED.region
                THEN users.profile_updated_at
                ELSE EXCLUDED.profile_updated_at
            END",
    )
    .bind(user_id_i64)
    .bind(&registration.handle)
    .bind(registration.region.as_str())
    .bind(Json(registration.profile.as_value()))
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    invalidate_user(db.cache(), registration.id).await;

    Ok(registration_outcome(
        previous.as_ref().map(|(handle, region)| (handle.as_str(), region.as_str())),
        registration,
    ))
}

/// Write result of a registration given the identity stored before it.
fn registration_outcome(
    previous: Option<(&str, &str)>,
    registration: &NewRegistration,
) -> WriteResult {
    match previous {
        None => WriteResult {
            matched: false,
            inserted: true,
            changed: true,
        },
        Some((handle, region)) => WriteResult {
            matched: true,
            inserted: false,
            changed: handle != registration.handle || region != registration.region.as_str(),
        },
    }
}

/// Replace only the profile column of an existing user.
pub async fn update_profile(
    db: &Database,
    user_id: u64,
    profile: &ProfileSnapshot,
) -> anyhow::Result<WriteResult> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    let changed: Option<bool> = sqlx::query_scalar(
        "WITH previous AS (
            SELECT id, profile FROM users WHERE id = $1 FOR UPDATE
        )
        UPDATE users AS u
        SET profile = $2, profile_updated_at = $3
        FROM previous
        WHERE u.id = previous.id
        RETURNING previous.profile IS DISTINCT FROM u.profile",
    )
    .bind(user_id_i64)
    .bind(Json(profile.as_value()))
    .bind(now)
    .fetch_optional(db.pool())
    .await?;

    invalidate_user(db.cache(), user_id).await;

    Ok(WriteResult {
        matched: changed.is_some(),
        inserted: false,
        changed: changed.unwrap_or(false),
    })
}

/// Set or clear the channel session reports are posted to.
pub async fn set_notify_channel(
    db: &Database,
    user_id: u64,
    channel_id: Option<u64>,
) -> anyhow::Result<bool> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let channel_id_i64 = channel_id
        .map(i64::try_from)
        .transpose()
        .context("channel_id out of i64 range")?;

    let updated = sqlx::query("UPDATE users SET notify_channel_id = $2 WHERE id = $1")
        .bind(user_id_i64)
        .bind(channel_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    invalidate_user(db.cache(), user_id).await;

    Ok(updated > 0)
}

/// Users whose profile should be re-fetched.
///
/// With `stale_before` unset every registered user is returned; otherwise only
/// users never refreshed or last refreshed before that unix timestamp.
pub async fn list_refresh_targets(
    db: &Database,
    stale_before: Option<u64>,
) -> anyhow::Result<Vec<RefreshTarget>> {
    let stale_before_i64 = stale_before
        .map(i64::try_from)
        .transpose()
        .context("stale_before out of i64 range")?;

    let rows: Vec<RefreshTargetRow> = sqlx::query_as(
        "SELECT id, handle, region
         FROM users
         WHERE $1::BIGINT IS NULL
            OR profile_updated_at IS NULL
            OR profile_updated_at < $1
         ORDER BY id ASC",
    )
    .bind(stale_before_i64)
    .fetch_all(db.pool())
    .await?;

    let mut targets = Vec::with_capacity(rows.len());
    for row in rows {
        let id = u64::try_from(row.id).context("id row out of u64 range")?;
        match row.region.parse::<Region>() {
            Ok(region) => targets.push(RefreshTarget {
                id,
                handle: row.handle,
                region,
            }),
            Err(source) => warn!(?source, user_id = id, "skipping user with unknown region"),
        }
    }

    Ok(targets)
}

/// Users ordered by the numeric value at `path` inside their profile, highest
/// first, ties by ascending id. Users without a numeric value at `path` are
/// left out. `regions` restricts the population; `limit` caps the result.
pub async fn query_ordered(
    db: &Database,
    regions: Option<&[Region]>,
    path: &[String],
    limit: Option<u32>,
) -> anyhow::Result<Vec<RankedEntry>> {
    let regions = regions.map(|regions| {
        regions
            .iter()
            .map(|region| region.as_str().to_owned())
            .collect::<Vec<_>>()
    });
    let limit = limit.map(i64::from);

    let rows: Vec<RankedRow> = sqlx::query_as(
        "SELECT id, handle, region, value
         FROM (
            SELECT
                id,
                handle,
                region,
                CASE
                    WHEN jsonb_typeof(profile #> $1) = 'number'
                    THEN (profile #>> $1)::DOUBLE PRECISION
                END AS value
            FROM users
            WHERE $2::TEXT[] IS NULL OR region = ANY($2)
         ) scored
         WHERE value IS NOT NULL
         ORDER BY value DESC, id ASC
         LIMIT $3",
    )
    .bind(path)
    .bind(regions)
    .bind(limit)
    .fetch_all(db.pool())
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        entries.push(RankedEntry {
            user_id: u64::try_from(row.id).context("id row out of u64 range")?,
            handle: row.handle,
            region: row.region.parse()?,
            value: row.value,
        });
    }

    Ok(entries)
}

pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
