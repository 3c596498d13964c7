use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use readshim_core::{CacheError, CacheKey, ResourceCache};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, CacheError>;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// An in-memory cache implementation using Moka.
///
/// Concurrent misses for the same key are coalesced into a single upstream
/// fetch by [`ResourceCache::get_or_compute`].
#[derive(Debug, Clone)]
pub struct MokaResourceCache {
    cache: Cache<CacheKey, Bytes>,
}

impl MokaResourceCache {
    /// Creates a new Moka cache with a default capacity of 10,000 entries.
    pub fn new() -> Self {
        let cache = Cache::builder().max_capacity(DEFAULT_MAX_CAPACITY).build();
        Self { cache }
    }

    /// Creates a new Moka cache with time-to-live (TTL) settings.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries the cache can hold
    /// * `ttl` - Time-to-live for cache entries
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .ttl(ttl)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceCache for MokaResourceCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        match self.cache.get(key).await {
            Some(value) => {
                debug!(key = %key, "Cache hit in Moka");
                Ok(Some(value))
            }
            None => {
                trace!(key = %key, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: Bytes) -> Result<()> {
        self.cache.insert(*key, value).await;
        trace!(key = %key, "Cached payload in Moka");
        Ok(())
    }

    async fn del(&self, key: &CacheKey) -> Result<()> {
        self.cache.invalidate(key).await;
        debug!(key = %key, "Removed payload from Moka cache (if present)");
        Ok(())
    }

    async fn get_or_compute<F, Fut>(
        &self,
        key: &CacheKey,
        fetch: F,
    ) -> readshim_core::Result<Bytes>
    where
        F: FnOnce(&CacheKey) -> Fut + Send,
        Fut: Future<Output = readshim_core::Result<Bytes>> + Send,
    {
        // try_get_with coalesces concurrent misses and never stores errors.
        self.cache
            .try_get_with(*key, async {
                trace!(key = %key, "Cache miss, performing single-flight fetch");
                fetch(key).await
            })
            .await
            .map_err(|e| e.as_ref().clone())
    }
}

/// Configuration for creating a [`MokaResourceCache`] with custom settings.
#[derive(Debug, TypedBuilder, Default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default, setter(strip_option))]
    max_capacity: Option<u64>,
    /// Time-to-live for cache entries.
    #[builder(default, setter(strip_option))]
    ttl: Option<Duration>,
}

impl From<CacheConfig> for MokaResourceCache {
    fn from(config: CacheConfig) -> Self {
        let mut builder =
            Cache::builder().max_capacity(config.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY));

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        MokaResourceCache {
            cache: builder.build(),
        }
    }
}
