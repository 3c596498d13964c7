//! Decides, per legacy endpoint, whether a request is answered with a body
//! or with a redirect to a related resource.
//!
//! Book lookups never return the full work with all of its editions, which
//! is far too large. They redirect to the work's first author instead,
//! carrying the edition, and the author lookup narrows that author down to
//! the single work the edition belongs to.

use crate::aggregator::BulkAggregator;
use crate::cache_control::{CachePolicy, TtlClass};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use bytes::Bytes;
use readshim_core::{Author, CacheKey, Controller, Error, ForeignId, Result, Work};
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Body of the changed-authors feed. The typo is part of the legacy format.
pub const CHANGED_AUTHORS_BODY: &str = r#"{"Limitted": true, "Ids": []}"#;

/// What a resolved request answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A JSON payload, returned with 200.
    Body(Bytes),
    /// A 303 redirect to another endpoint.
    Redirect(String),
}

/// A resolved request: its outcome plus the cache headers it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub cache: Option<CachePolicy>,
}

impl Resolution {
    fn body(body: impl Into<Bytes>, cache: CachePolicy) -> Self {
        Self {
            outcome: Outcome::Body(body.into()),
            cache: Some(cache),
        }
    }

    fn redirect(location: String, cache: Option<CachePolicy>) -> Self {
        Self {
            outcome: Outcome::Redirect(location),
            cache,
        }
    }
}

impl IntoResponse for Resolution {
    fn into_response(self) -> Response {
        let response = match self.outcome {
            Outcome::Body(body) => (StatusCode::OK, body).into_response(),
            Outcome::Redirect(location) => {
                debug!(location = %location, "redirecting");
                Redirect::to(&location).into_response()
            }
        };
        match self.cache {
            Some(cache) => (cache, response).into_response(),
            None => response,
        }
    }
}

/// Resolves legacy requests against a [`Controller`].
#[derive(Clone)]
pub struct Resolver {
    controller: Arc<dyn Controller>,
    aggregator: BulkAggregator,
}

impl Resolver {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        let aggregator = BulkAggregator::new(Arc::clone(&controller));
        Self {
            controller,
            aggregator,
        }
    }

    /// `GET /work/{id}`: the work itself.
    pub async fn work(&self, id: ForeignId) -> Result<Resolution> {
        let body = self.controller.get_work(id).await?;
        Ok(Resolution::body(body, TtlClass::Work.policy(false)))
    }

    /// `GET /book/{id}`: a redirect to the owning work's first author,
    /// narrowed to this edition.
    ///
    /// A work without authors redirects to the work lookup instead. Legacy
    /// clients crash on that response, but upstream works always carry an
    /// author.
    pub async fn book(&self, id: ForeignId) -> Result<Resolution> {
        let bytes = self.controller.get_book(id).await?;
        let work: Work = decode(&bytes, "work")?;

        let location = match work.first_author() {
            Some(author) => format!("/author/{}?edition={}", author.foreign_id, id),
            None => {
                warn!(book_id = %id, work_id = work.foreign_id, "work has no authors");
                format!("/work/{}", work.foreign_id)
            }
        };
        Ok(Resolution::redirect(
            location,
            Some(TtlClass::Edition.policy(false)),
        ))
    }

    /// `GET /author/{id}[?edition={book_id}]`: the author, or with an edition
    /// the author holding only the work that edition belongs to.
    ///
    /// Both forms key the CDN cache on the query string so that different
    /// editions never share an entry.
    pub async fn author(&self, id: ForeignId, edition: Option<ForeignId>) -> Result<Resolution> {
        let bytes = self.controller.get_author(id).await?;
        let cache = TtlClass::Author.policy(true);

        let Some(book_id) = edition else {
            return Ok(Resolution::body(bytes, cache));
        };

        let mut author: Author = decode(&bytes, "author")?;
        let work: Work = decode(&self.controller.get_book(book_id).await?, "work")?;
        author.narrow_to(work);

        let body = serde_json::to_vec(&author)
            .map_err(|e| Error::Internal(format!("encoding author {id}: {e}")))?;
        Ok(Resolution::body(body, cache))
    }

    /// `GET /author/changed`: always the empty "limited" feed.
    ///
    /// Clients fall back to re-fetching individual authors, which hit the
    /// CDN and pick up changes as entries are purged.
    pub fn changed_authors(&self) -> Resolution {
        Resolution::body(CHANGED_AUTHORS_BODY, TtlClass::Search.policy(false))
    }

    /// `POST /book/bulk`: redirects to the equivalent, cacheable GET.
    ///
    /// `path` is the request path the query string is appended to. A `null`
    /// body counts as an empty list.
    pub fn bulk_redirect(&self, path: &str, body: &[u8]) -> Result<Resolution> {
        let ids: Vec<i64> = serde_json::from_slice::<Option<Vec<i64>>>(body)
            .map_err(|e| Error::BadRequest(format!("invalid id list: {e}")))?
            .unwrap_or_default();
        if ids.is_empty() {
            return Err(Error::MissingIds);
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        for id in &ids {
            query.append_pair("id", &id.to_string());
        }
        Ok(Resolution::redirect(
            format!("{path}?{}", query.finish()),
            None,
        ))
    }

    /// `GET /book/bulk?id=..&id=..`: the aggregated works, authors and series.
    pub async fn bulk(&self, query: Option<&str>) -> Result<Resolution> {
        let ids = form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .filter(|(key, _)| key == "id")
            .map(|(_, value)| ForeignId::from_path(&value))
            .collect::<Result<Vec<_>>>()?;

        let result = self.aggregator.aggregate(&ids).await?;
        let body = serde_json::to_vec(&result)
            .map_err(|e| Error::Internal(format!("encoding bulk result: {e}")))?;
        Ok(Resolution::body(body, TtlClass::Search.policy(true)))
    }

    /// `DELETE` on any resource: purges the cached payload.
    ///
    /// Always succeeds; a failed purge is only logged.
    pub async fn invalidate(&self, key: CacheKey) {
        if let Err(e) = self.controller.invalidate(&key).await {
            warn!(key = %key, error = %e, "failed to invalidate cache entry");
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8], kind: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Internal(format!("decoding {kind}: {e}")))
}
