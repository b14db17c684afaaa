//! Ingredient handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::ApiError, models::ingredient::IngredientQuery, state::AppState};

/// Get ingredients, optionally filtered by a substring of the name
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredients = state.ingredients.list(query.name.as_deref()).await?;

    Ok(Json(ingredients))
}

/// Get an ingredient by ID
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = state
        .ingredients
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Ingredient"))?;

    Ok(Json(ingredient))
}
