mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

/// How long a user record stays cached for command lookups.
pub const USER_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled,
    Redis(RedisCacheStore),
}

/// Optional read-through cache in front of PostgreSQL.
///
/// With the disabled backend every lookup misses and every write is a no-op,
/// so callers never need to branch on whether Redis is configured.
#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let bytes = match &self.backend {
            CacheBackend::Disabled => return Ok(None),
            CacheBackend::Redis(store) => store.get(key).await?,
        };

        bytes
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
                })
            })
            .transpose()
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let CacheBackend::Redis(store) = &self.backend else {
            return Ok(());
        };

        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;
        store.set(key, payload, ttl.as_secs().max(1)).await
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    /// Return the cached value for `key`, or run `loader` and cache its result.
    ///
    /// Cache failures are logged and never fail the lookup. `None` results are
    /// not cached so a freshly registered user is visible immediately.
    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(Some(cached)),
            Ok(None) => {}
            Err(e) => warn!(?e, cache_key = key, "cache get failed; falling back to database"),
        }

        let loaded = loader().await?;

        if let Some(value) = &loaded {
            if let Err(e) = self.set_json(key, value, ttl).await {
                warn!(?e, cache_key = key, "cache set failed; returning database value");
            }
        }

        Ok(loaded)
    }
}

pub fn user_key(cache: &CacheService, user_id: u64) -> String {
    cache.key(format!("user:{user_id}"))
}

/// Drop the cached record after any write to the user row. Failures are logged
/// only: the short TTL bounds how stale a missed invalidation can be.
pub async fn invalidate_user(cache: &CacheService, user_id: u64) {
    let key = user_key(cache, user_id);
    if let Err(e) = cache.del(&key).await {
        warn!(?e, cache_key = %key, "failed to invalidate cached user");
    }
}
