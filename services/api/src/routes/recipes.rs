//! Recipe handlers: CRUD, list toggles, the shopping-list download, and
//! short links

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::Query as MultiQuery;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{CurrentUser, MaybeUser},
    models::clamp_paging,
    models::recipe::{RecipeQuery, RecipeRequest},
    models::user::User,
    repositories::RecipeListKind,
    state::AppState,
};

/// Get recipes with filtering and pagination
///
/// The `tags` filter accumulates across repeated query keys, hence the
/// multi-value extractor.
pub async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    MultiQuery(query): MultiQuery<RecipeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let paging = clamp_paging(query.page, query.limit, state.config.page_size);
    let page = state.recipes.list(viewer.as_ref(), &query, paging).await?;

    Ok(Json(page))
}

/// Create a recipe
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(author): CurrentUser,
    Json(payload): Json<RecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state.recipes.create(&author, &payload).await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Get a recipe's full representation
pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state.recipes.detail(id, viewer.as_ref()).await?;

    Ok(Json(recipe))
}

/// Update a recipe; only its author (or staff) may
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = state.recipes.update(&caller, id, &payload).await?;

    Ok(Json(recipe))
}

/// Delete a recipe; only its author (or staff) may
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.recipes.delete(&caller, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add the recipe to one of the caller's lists and return its short view
async fn add_to_list(
    state: &AppState,
    kind: RecipeListKind,
    caller: &User,
    recipe_id: Uuid,
) -> Result<impl IntoResponse + use<>, ApiError> {
    // 404 for an unknown recipe, before the insert can report 400.
    let short = state.recipes.short(recipe_id).await?;
    state.recipe_lists.add(kind, caller.id, recipe_id).await?;

    Ok((StatusCode::CREATED, Json(short)))
}

/// Remove the recipe from one of the caller's lists
async fn remove_from_list(
    state: &AppState,
    kind: RecipeListKind,
    caller: &User,
    recipe_id: Uuid,
) -> Result<impl IntoResponse + use<>, ApiError> {
    if !state.recipes.exists(recipe_id).await? {
        return Err(ApiError::NotFound("Recipe"));
    }
    state
        .recipe_lists
        .remove(kind, caller.id, recipe_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the caller's favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    add_to_list(&state, RecipeListKind::Favorites, &caller, id).await
}

/// Remove a recipe from the caller's favorites
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    remove_from_list(&state, RecipeListKind::Favorites, &caller, id).await
}

/// Add a recipe to the caller's shopping cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    add_to_list(&state, RecipeListKind::ShoppingCart, &caller, id).await
}

/// Remove a recipe from the caller's shopping cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    remove_from_list(&state, RecipeListKind::ShoppingCart, &caller, id).await
}

/// Download the caller's aggregated shopping list as a text attachment
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let (filename, report) = state.shopping_list.build(&caller).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report,
    ))
}

/// Get a short link for a recipe
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.recipes.exists(id).await? {
        return Err(ApiError::NotFound("Recipe"));
    }

    Ok(Json(json!({
        "short-link": format!("{}/s/{}", state.config.base_url, id)
    })))
}

/// Resolve a short link to the recipe's page
pub async fn short_link_redirect(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.recipes.exists(id).await? {
        return Err(ApiError::NotFound("Recipe"));
    }

    Ok(Redirect::to(&format!("/recipes/{}/", id)))
}
