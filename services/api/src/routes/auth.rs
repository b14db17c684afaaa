//! Login and logout handlers

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::warn;

use crate::{
    error::ApiError,
    middleware::CurrentUser,
    models::user::{LoginRequest, TokenResponse},
    state::AppState,
};

/// Issue a token for valid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !state.users.verify_password(&user, &payload.password).await? {
        warn!("Failed login attempt for user {}", user.id);
        return Err(ApiError::InvalidCredentials);
    }

    let auth_token = state.tokens.issue(user.id).await?;

    Ok(Json(TokenResponse { auth_token }))
}

/// Revoke the caller's tokens
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    state.tokens.revoke_all(user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
