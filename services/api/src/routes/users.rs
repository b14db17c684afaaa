//! User account, profile, and subscription handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{CurrentUser, MaybeUser},
    models::user::{
        AvatarRequest, AvatarResponse, CreateUserRequest, CreatedUserResponse, SetPasswordRequest,
        SubscribeQuery, SubscriptionsQuery, UserResponse,
    },
    models::{Page, PageQuery, clamp_paging},
    state::AppState,
    validation,
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_email(&payload.email).map_err(|message| ApiError::InvalidField {
        field: "email",
        message,
    })?;
    validation::validate_username(&payload.username).map_err(|message| ApiError::InvalidField {
        field: "username",
        message,
    })?;
    validation::validate_name(&payload.first_name).map_err(|message| ApiError::InvalidField {
        field: "first_name",
        message,
    })?;
    validation::validate_name(&payload.last_name).map_err(|message| ApiError::InvalidField {
        field: "last_name",
        message,
    })?;
    validation::validate_password(&payload.password).map_err(|message| ApiError::InvalidField {
        field: "password",
        message,
    })?;

    let user = state.users.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse::from_user(&user)),
    ))
}

/// Get users with pagination
pub async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let paging = query.clamp(state.config.page_size);
    let (users, total) = state.users.list(paging).await?;

    let followed = match &viewer {
        Some(viewer) => {
            let ids: Vec<Uuid> = users.iter().map(|user| user.id).collect();
            state.follows.followed_ids(viewer.id, &ids).await?
        }
        None => HashSet::new(),
    };

    let items: Vec<UserResponse> = users
        .iter()
        .map(|user| UserResponse::from_user(user, followed.contains(&user.id)))
        .collect();

    Ok(Json(Page {
        items,
        page: paging.page,
        limit: paging.limit,
        total,
    }))
}

/// Get a user's profile
pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let is_subscribed = match &viewer {
        Some(viewer) => state.follows.is_following(viewer.id, user.id).await?,
        None => false,
    };

    Ok(Json(UserResponse::from_user(&user, is_subscribed)))
}

/// Get the caller's own profile; one cannot subscribe to oneself
pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(UserResponse::from_user(&user, false))
}

/// Change the caller's password
pub async fn set_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_password(&payload.new_password).map_err(|message| {
        ApiError::InvalidField {
            field: "new_password",
            message,
        }
    })?;

    if !state
        .users
        .verify_password(&user, &payload.current_password)
        .await?
    {
        return Err(ApiError::InvalidField {
            field: "current_password",
            message: "Wrong password".to_string(),
        });
    }

    state.users.set_password(user.id, &payload.new_password).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the caller's avatar
pub async fn set_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AvatarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let avatar = payload
        .avatar
        .ok_or(ApiError::EmptyField { field: "avatar" })?;

    state.users.set_avatar(user.id, Some(&avatar)).await?;

    Ok((
        StatusCode::CREATED,
        Json(AvatarResponse {
            avatar: Some(avatar),
        }),
    ))
}

/// Clear the caller's avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    state.users.set_avatar(user.id, None).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Subscribe to an author
pub async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<SubscribeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let card = state
        .subscriptions
        .subscribe(&caller, &author, query.recipes_limit)
        .await?;

    Ok((StatusCode::CREATED, Json(card)))
}

/// Unsubscribe from an author
pub async fn unsubscribe(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let author = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    state.subscriptions.unsubscribe(&caller, author.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Authors the caller follows, with recipe previews
pub async fn subscriptions(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let paging = clamp_paging(query.page, query.limit, state.config.page_size);

    let page = state
        .subscriptions
        .list(&caller, paging, query.recipes_limit)
        .await?;

    Ok(Json(page))
}
