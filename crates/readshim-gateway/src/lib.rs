//! HTTP gateway serving the legacy book-metadata API.
//!
//! Requests enter through the [`App`](app::App) router, are resolved by the
//! [`Resolver`](resolver::Resolver) into either a body or a redirect, and
//! leave with the cache headers chosen by [`cache_control`].

pub mod aggregator;
pub mod app;
pub mod cache_control;
pub mod error;
pub mod handlers;
pub mod resolver;
pub mod state;
pub mod upstream;

pub use aggregator::{BulkAccumulator, BulkAggregator};
pub use app::App;
pub use cache_control::{cache_for, CachePolicy, TtlClass};
pub use error::AppError;
pub use resolver::{Outcome, Resolution, Resolver};
pub use state::AppState;
pub use upstream::HttpUpstream;
