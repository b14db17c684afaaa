//! User models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::recipe::ShortRecipeResponse;

/// User entity as stored in the database
///
/// Never serialized directly; responses go through [`UserResponse`] so the
/// password hash cannot leak.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// Request for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Response returned right after registration
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUserResponse {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl CreatedUserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Public user representation, annotated relative to the caller
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
            avatar: user.avatar.clone(),
        }
    }
}

/// Followed-author representation: the user card plus a preview of their
/// recipes
#[derive(Debug, Clone, Serialize)]
pub struct FollowedUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: i64,
}

/// Request for logging in; email is the login identifier
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying a freshly issued (or re-used) token
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Request for changing the caller's password
#[derive(Debug, Clone, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

/// Request for replacing the caller's avatar
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

/// Response carrying the caller's avatar reference
#[derive(Debug, Clone, Serialize)]
pub struct AvatarResponse {
    pub avatar: Option<String>,
}

/// Query parameters for the subscriptions listing
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Cap on how many recipes each followed author's card carries
    pub recipes_limit: Option<u32>,
}

/// Query parameters accepted when subscribing to an author
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<u32>,
}
