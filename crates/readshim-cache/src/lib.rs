//! Cache implementations and the caching controller.
//!
//! [`CachedController`] composes any [`Upstream`](readshim_core::Upstream)
//! with any [`ResourceCache`](readshim_core::ResourceCache) to provide
//! read-through caching with explicit invalidation by key.
//!
//! # Example
//!
//! ```rust
//! use readshim_cache::{CachedController, MokaResourceCache};
//! use readshim_core::{Controller, ForeignId, InMemoryUpstream};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = CachedController::new(InMemoryUpstream::new(), MokaResourceCache::new());
//!
//! let work = controller.get_work(ForeignId::new(9)?).await;
//! assert!(work.is_err());
//! # Ok(())
//! # }
//! ```

pub mod cached;
pub mod moka;
pub mod redis;

pub use cached::CachedController;
pub use self::moka::{CacheConfig, MokaResourceCache};
pub use self::redis::RedisResourceCache;
