use crate::error::Result;
use crate::resolver::Resolution;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use readshim_core::{CacheKey, ForeignId};

pub async fn get_work_handler(
    Path(foreign_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Resolution> {
    let id = ForeignId::from_path(&foreign_id)?;
    Ok(state.resolver().work(id).await?)
}

pub async fn delete_work_handler(
    Path(foreign_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let id = ForeignId::from_path(&foreign_id)?;
    state.resolver().invalidate(CacheKey::Work(id)).await;
    Ok(StatusCode::OK)
}
