pub mod memory;

use crate::error::Result;
use crate::foreign_id::ForeignId;
use async_trait::async_trait;
use bytes::Bytes;

pub use memory::InMemoryUpstream;

/// The data source behind the gateway.
///
/// An upstream reports absence as [`Error::NotFound`](crate::Error::NotFound)
/// and owns its own timeouts and retries.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// Fetches the work owning the given edition.
    async fn book(&self, id: ForeignId) -> Result<Bytes>;

    async fn work(&self, id: ForeignId) -> Result<Bytes>;

    async fn author(&self, id: ForeignId) -> Result<Bytes>;
}
