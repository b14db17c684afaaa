//! Tag handlers

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Get all tags
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.tags.list().await?;

    Ok(Json(tags))
}

/// Get a tag by ID
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state
        .tags
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Tag"))?;

    Ok(Json(tag))
}
