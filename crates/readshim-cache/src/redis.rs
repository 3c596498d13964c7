use async_trait::async_trait;
use bytes::Bytes;
use readshim_core::{CacheError, CacheKey, ResourceCache};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

type Result<T> = std::result::Result<T, CacheError>;

pub const DEFAULT_KEY_PREFIX: &str = "rs:";

/// A Redis-based implementation of [`ResourceCache`].
///
/// Payloads are stored as raw bytes under `<prefix><kind>:<id>`, optionally
/// with an expiry.
#[derive(Clone)]
pub struct RedisResourceCache {
    conn: redis::aio::ConnectionManager,
    key_prefix: String,
    ttl: Option<Duration>,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisResourceCache {
    /// Creates a new Redis cache with the default `rs:` key prefix and no expiry.
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: None,
        }
    }

    /// Connects to Redis at `url` and creates a cache on top of it.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }

    /// Uses a custom prefix for cache keys (e.g., "myapp:").
    pub fn with_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Expires entries after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn cache_key(&self, key: &CacheKey) -> String {
        prefixed_key(&self.key_prefix, key)
    }
}

fn prefixed_key(prefix: &str, key: &CacheKey) -> String {
    format!("{prefix}{key}")
}

/// Whole seconds for `SET EX`, which rejects zero.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl ResourceCache for RedisResourceCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        let redis_key = self.cache_key(key);
        trace!(key = %key, "Fetching payload from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<Vec<u8>>>(&redis_key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "Cache hit in Redis");
                Ok(Some(Bytes::from(cached)))
            }
            Ok(None) => {
                trace!(key = %key, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: Bytes) -> Result<()> {
        let redis_key = self.cache_key(key);
        trace!(key = %key, "Storing payload in Redis cache");

        let mut conn = self.conn.clone();
        let result = match self.ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(&redis_key, value.as_ref(), expiry_secs(ttl))
                    .await
            }
            None => conn.set::<_, _, ()>(&redis_key, value.as_ref()).await,
        };

        result.map_err(|e| {
            warn!(key = %key, error = %e, "Failed to cache payload in Redis");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn del(&self, key: &CacheKey) -> Result<()> {
        let redis_key = self.cache_key(key);

        let mut conn = self.conn.clone();
        match conn.del::<_, ()>(&redis_key).await {
            Ok(()) => {
                debug!(key = %key, "Removed payload from Redis cache");
                Ok(())
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to remove payload from Redis cache");
                Err(map_redis_error("failed to delete value from Redis", e))
            }
        }
    }
}
