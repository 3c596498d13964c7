use crate::cache::CacheKey;
use crate::error::Result;
use crate::foreign_id::ForeignId;
use async_trait::async_trait;
use bytes::Bytes;

/// The narrow facade the gateway resolves legacy requests through.
///
/// Payloads are returned serialized; callers decode only when they need to
/// reshape the response.
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Returns the serialized [`Work`](crate::Work) owning the given edition.
    async fn get_book(&self, id: ForeignId) -> Result<Bytes>;

    /// Returns the serialized [`Work`](crate::Work) with the given ID.
    async fn get_work(&self, id: ForeignId) -> Result<Bytes>;

    /// Returns the serialized [`Author`](crate::Author) with the given ID.
    async fn get_author(&self, id: ForeignId) -> Result<Bytes>;

    /// Drops any cached payload under `key`.
    ///
    /// It is not an error if the key does not exist.
    async fn invalidate(&self, key: &CacheKey) -> Result<()>;
}
