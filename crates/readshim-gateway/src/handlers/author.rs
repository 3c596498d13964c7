use crate::error::Result;
use crate::resolver::Resolution;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use readshim_core::{CacheKey, ForeignId};
use url::form_urlencoded;

pub async fn get_author_handler(
    Path(foreign_author_id): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<AppState>,
) -> Result<Resolution> {
    let id = ForeignId::from_path(&foreign_author_id)?;
    let edition = edition_param(query.as_deref())
        .map(|e| ForeignId::from_path(&e))
        .transpose()?;
    Ok(state.resolver().author(id, edition).await?)
}

/// The book ID the author should be narrowed to: the first `edition`
/// parameter, with an empty value treated as absent.
fn edition_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "edition")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

pub async fn delete_author_handler(
    Path(foreign_author_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let id = ForeignId::from_path(&foreign_author_id)?;
    state.resolver().invalidate(CacheKey::Author(id)).await;
    Ok(StatusCode::OK)
}

/// `GET /author/changed?since=..` ignores `since` entirely.
pub async fn author_changed_handler(State(state): State<AppState>) -> Resolution {
    state.resolver().changed_authors()
}
