use crate::error::Result;
use crate::resolver::Resolution;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::{StatusCode, Uri};
use bytes::Bytes;
use readshim_core::{CacheKey, ForeignId};

/// `GET /book/{id}` always answers with a redirect, never with the work.
pub async fn get_book_handler(
    Path(foreign_edition_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Resolution> {
    let id = ForeignId::from_path(&foreign_edition_id)?;
    Ok(state.resolver().book(id).await?)
}

pub async fn delete_book_handler(
    Path(foreign_edition_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let id = ForeignId::from_path(&foreign_edition_id)?;
    state.resolver().invalidate(CacheKey::Book(id)).await;
    Ok(StatusCode::OK)
}

/// Bulk lookups arrive as POST, which CDNs do not cache, so they are
/// redirected to the equivalent GET.
pub async fn bulk_book_redirect_handler(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Resolution> {
    Ok(state.resolver().bulk_redirect(uri.path(), &body)?)
}

pub async fn bulk_book_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Resolution> {
    Ok(state.resolver().bulk(query.as_deref()).await?)
}
