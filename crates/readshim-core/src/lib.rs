//! Core types and traits for the readshim legacy API gateway.
//!
//! This crate provides the resource projections served to legacy clients,
//! the foreign ID codec, and the seams (upstream, cache, controller) shared
//! by the cache and gateway crates.

pub mod cache;
pub mod controller;
pub mod error;
pub mod foreign_id;
pub mod resource;
pub mod upstream;

pub use cache::{CacheKey, ResourceCache};
pub use controller::Controller;
pub use error::{CacheError, Error, Result};
pub use foreign_id::ForeignId;
pub use resource::{Author, Book, BulkBook, Contributor, Series, SeriesLink, Work};
pub use upstream::{InMemoryUpstream, Upstream};
