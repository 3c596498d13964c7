//! Response cache headers for the CDN in front of the gateway.
//!
//! `s-maxage` carries the per-resource CDN lifetime while browsers and
//! clients always revalidate after an hour. Stale CDN entries are purged by
//! the DELETE endpoints rather than by expiry.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, VARY};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use std::convert::Infallible;
use std::time::Duration;

/// Client-facing `max-age`, independent of the CDN lifetime.
pub const CLIENT_MAX_AGE: Duration = Duration::from_secs(3600);

const DAY: u64 = 24 * 60 * 60;

/// Named CDN lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Work,
    Edition,
    Author,
    /// Bulk lookups and the changed-authors feed.
    Search,
}

impl TtlClass {
    pub const fn duration(self) -> Duration {
        match self {
            TtlClass::Work => Duration::from_secs(30 * DAY),
            TtlClass::Edition => Duration::from_secs(30 * DAY),
            TtlClass::Author => Duration::from_secs(7 * DAY),
            TtlClass::Search => Duration::from_secs(DAY),
        }
    }

    /// Policy for this class; see [`cache_for`].
    pub fn policy(self, vary_params: bool) -> CachePolicy {
        cache_for(self.duration(), vary_params)
    }
}

/// The cache headers attached to a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    ttl: Duration,
    vary_params: bool,
}

/// Builds the cache policy for a response held `ttl` by the CDN.
///
/// Set `vary_params` when query parameters select different data, so the
/// CDN keys entries on them. Otherwise `No-Vary-Search: params` tells it to
/// ignore the query string.
pub fn cache_for(ttl: Duration, vary_params: bool) -> CachePolicy {
    CachePolicy { ttl, vary_params }
}

impl CachePolicy {
    pub fn varies_on_params(&self) -> bool {
        self.vary_params
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let cache_control = format!(
            "public, s-maxage={}, max-age={}",
            self.ttl.as_secs(),
            CLIENT_MAX_AGE.as_secs()
        );
        if let Ok(value) = HeaderValue::from_str(&cache_control) {
            headers.insert(CACHE_CONTROL, value);
        }
        // User-Agent and friends stay out of the cache key.
        headers.insert(VARY, HeaderValue::from_static("Content-Type, Accept-Encoding"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !self.vary_params {
            headers.insert(
                HeaderName::from_static("no-vary-search"),
                HeaderValue::from_static("params"),
            );
        }
        headers
    }
}

impl IntoResponseParts for CachePolicy {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().extend(self.headers());
        Ok(res)
    }
}
