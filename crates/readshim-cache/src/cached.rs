use async_trait::async_trait;
use bytes::Bytes;
use readshim_core::{CacheKey, Controller, ForeignId, ResourceCache, Result, Upstream};
use tracing::trace;

/// A [`Controller`] that reads through a cache in front of an upstream.
///
/// Reads check the cache first, falling back to the upstream. Successful
/// upstream reads are cached; failures, including not-found, never are.
/// Entries stay until they are invalidated explicitly or the cache backend
/// expires them.
#[derive(Debug, Clone)]
pub struct CachedController<U, C> {
    upstream: U,
    cache: C,
}

impl<U: Upstream, C: ResourceCache> CachedController<U, C> {
    /// Creates a new cached controller.
    ///
    /// # Arguments
    ///
    /// * `upstream` - The data source resolving foreign IDs
    /// * `cache` - The cache implementation (e.g., [`MokaResourceCache`](crate::MokaResourceCache))
    pub fn new(upstream: U, cache: C) -> Self {
        Self { upstream, cache }
    }

    async fn fetch(&self, key: CacheKey) -> Result<Bytes> {
        trace!(key = %key, "Fetching payload with cache");

        self.cache
            .get_or_compute(&key, |key| {
                let key = *key;
                async move {
                    trace!(key = %key, "Cache miss, fetching from upstream");
                    match key {
                        CacheKey::Book(id) => self.upstream.book(id).await,
                        CacheKey::Work(id) => self.upstream.work(id).await,
                        CacheKey::Author(id) => self.upstream.author(id).await,
                    }
                }
            })
            .await
    }
}

#[async_trait]
impl<U: Upstream, C: ResourceCache> Controller for CachedController<U, C> {
    async fn get_book(&self, id: ForeignId) -> Result<Bytes> {
        self.fetch(CacheKey::Book(id)).await
    }

    async fn get_work(&self, id: ForeignId) -> Result<Bytes> {
        self.fetch(CacheKey::Work(id)).await
    }

    async fn get_author(&self, id: ForeignId) -> Result<Bytes> {
        self.fetch(CacheKey::Author(id)).await
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        trace!(key = %key, "Invalidating cache entry");
        self.cache.del(key).await?;
        Ok(())
    }
}
