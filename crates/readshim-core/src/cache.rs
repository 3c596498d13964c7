use crate::error::{CacheError, Result};
use crate::foreign_id::ForeignId;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Display;
use std::future::Future;
use tracing::{trace, warn};

/// Key of a cached upstream payload, namespaced by resource kind.
///
/// Renders as `work:<id>`, `book:<id>` or `author:<id>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Work(ForeignId),
    Book(ForeignId),
    Author(ForeignId),
}

impl CacheKey {
    pub fn id(&self) -> ForeignId {
        match self {
            CacheKey::Work(id) | CacheKey::Book(id) | CacheKey::Author(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::Work(_) => "work",
            CacheKey::Book(_) => "book",
            CacheKey::Author(_) => "author",
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// A cache of serialized upstream payloads.
///
/// Entries are only removed by explicit [`ResourceCache::del`] or by the
/// backend's own expiry; this trait defines no eviction policy.
#[async_trait]
pub trait ResourceCache: Send + Sync + 'static {
    /// Get a payload from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, key: &CacheKey) -> std::result::Result<Option<Bytes>, CacheError>;

    /// Store a payload in cache.
    async fn set(&self, key: &CacheKey, value: Bytes) -> std::result::Result<(), CacheError>;

    /// Remove a payload from cache.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, key: &CacheKey) -> std::result::Result<(), CacheError>;

    /// Get a payload from cache, computing it if not present.
    ///
    /// Failed computations are not cached. A failing cache backend degrades
    /// to calling `fetch` directly.
    async fn get_or_compute<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Bytes>
    where
        F: FnOnce(&CacheKey) -> Fut + Send,
        Fut: Future<Output = Result<Bytes>> + Send,
    {
        match self.get(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => trace!(key = %key, "cache miss"),
            Err(e) => warn!(key = %key, error = %e, "cache read failed, falling back to upstream"),
        }

        let value = fetch(key).await?;
        if let Err(e) = self.set(key, value.clone()).await {
            warn!(key = %key, error = %e, "failed to backfill cache");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct TestCache {
        items: Mutex<HashMap<String, Bytes>>,
        broken: bool,
    }

    #[async_trait]
    impl ResourceCache for TestCache {
        async fn get(&self, key: &CacheKey) -> std::result::Result<Option<Bytes>, CacheError> {
            if self.broken {
                return Err(CacheError::Unavailable("down".into()));
            }
            Ok(self.items.lock().await.get(&key.to_string()).cloned())
        }

        async fn set(&self, key: &CacheKey, value: Bytes) -> std::result::Result<(), CacheError> {
            if self.broken {
                return Err(CacheError::Unavailable("down".into()));
            }
            self.items.lock().await.insert(key.to_string(), value);
            Ok(())
        }

        async fn del(&self, key: &CacheKey) -> std::result::Result<(), CacheError> {
            self.items.lock().await.remove(&key.to_string());
            Ok(())
        }
    }

    fn id(n: i64) -> ForeignId {
        ForeignId::new(n).unwrap()
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(CacheKey::Work(id(9)).to_string(), "work:9");
        assert_eq!(CacheKey::Book(id(500)).to_string(), "book:500");
        assert_eq!(CacheKey::Author(id(7)).to_string(), "author:7");
    }

    #[tokio::test]
    async fn get_or_compute_returns_cached_value_without_fetch() {
        let cache = TestCache::default();
        let key = CacheKey::Work(id(1));
        cache.set(&key, Bytes::from_static(b"cached")).await.unwrap();

        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let result = cache
            .get_or_compute(&key, {
                let fetch_calls = Arc::clone(&fetch_calls);
                move |_| async move {
                    fetch_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Bytes::from_static(b"fetched"))
                }
            })
            .await
            .unwrap();

        assert_eq!(result, Bytes::from_static(b"cached"));
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_or_compute_fetches_and_backfills_on_cache_miss() {
        let cache = TestCache::default();
        let key = CacheKey::Book(id(2));

        let result = cache
            .get_or_compute(&key, |_| async { Ok(Bytes::from_static(b"fetched")) })
            .await
            .unwrap();

        assert_eq!(result, Bytes::from_static(b"fetched"));
        assert_eq!(
            cache.get(&key).await.unwrap(),
            Some(Bytes::from_static(b"fetched"))
        );
    }

    #[tokio::test]
    async fn get_or_compute_does_not_cache_failures() {
        let cache = TestCache::default();
        let key = CacheKey::Author(id(3));

        let err = cache
            .get_or_compute(&key, |k| {
                let missing = k.to_string();
                async move { Err(Error::NotFound(missing)) }
            })
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_or_compute_survives_a_broken_backend() {
        let cache = TestCache {
            broken: true,
            ..Default::default()
        };
        let key = CacheKey::Work(id(4));

        let result = cache
            .get_or_compute(&key, |_| async { Ok(Bytes::from_static(b"fresh")) })
            .await
            .unwrap();

        assert_eq!(result, Bytes::from_static(b"fresh"));
    }
}
