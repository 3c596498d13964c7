use crate::cache::CacheKey;
use crate::error::{Error, Result};
use crate::foreign_id::ForeignId;
use crate::resource::{Author, Work};
use crate::upstream::Upstream;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory storage entry for a resource lookup.
#[derive(Debug, Clone)]
enum Entry {
    Payload(Bytes),
    Failure(Error),
}

/// In-memory implementation of [`Upstream`] using DashMap.
///
/// Besides serving stored payloads it can be told to fail specific lookups,
/// and it counts every fetch it receives.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUpstream {
    storage: Arc<DashMap<CacheKey, Entry>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryUpstream {
    /// Creates a new, empty in-memory upstream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the work served for `GET /book/{id}`.
    pub fn insert_book(&self, id: ForeignId, work: &Work) {
        self.insert(CacheKey::Book(id), work);
    }

    pub fn insert_work(&self, id: ForeignId, work: &Work) {
        self.insert(CacheKey::Work(id), work);
    }

    pub fn insert_author(&self, id: ForeignId, author: &Author) {
        self.insert(CacheKey::Author(id), author);
    }

    /// Stores a raw payload, bypassing serialization.
    pub fn insert_raw(&self, key: CacheKey, payload: impl Into<Bytes>) {
        self.storage.insert(key, Entry::Payload(payload.into()));
    }

    /// Makes every lookup of `key` fail with `error`.
    pub fn fail(&self, key: CacheKey, error: Error) {
        self.storage.insert(key, Entry::Failure(error));
    }

    /// Removes whatever is stored under `key`.
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.storage.remove(key).is_some()
    }

    /// Number of lookups served so far, including failed ones.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn insert<T: Serialize>(&self, key: CacheKey, value: &T) {
        // Resource types only hold strings, numbers and vectors.
        let payload = serde_json::to_vec(value).unwrap_or_default();
        self.storage.insert(key, Entry::Payload(Bytes::from(payload)));
    }

    fn lookup(&self, key: CacheKey) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.storage.get(&key).map(|entry| entry.value().clone()) {
            Some(Entry::Payload(bytes)) => Ok(bytes),
            Some(Entry::Failure(error)) => Err(error),
            None => Err(Error::NotFound(key.to_string())),
        }
    }
}

#[async_trait]
impl Upstream for InMemoryUpstream {
    async fn book(&self, id: ForeignId) -> Result<Bytes> {
        self.lookup(CacheKey::Book(id))
    }

    async fn work(&self, id: ForeignId) -> Result<Bytes> {
        self.lookup(CacheKey::Work(id))
    }

    async fn author(&self, id: ForeignId) -> Result<Bytes> {
        self.lookup(CacheKey::Author(id))
    }
}
