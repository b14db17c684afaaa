//! Follow repository (directed subscriptions between users)

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::Paging;
use crate::models::user::User;

/// Follow repository
#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    /// Create a new follow repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record the subscription
    ///
    /// The insert goes straight to the table; the pair constraint decides
    /// who wins when two subscribes race, and the self-follow check backs
    /// up the validation layer.
    pub async fn add(&self, follower_id: Uuid, followed_id: Uuid) -> ApiResult<()> {
        sqlx::query("INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2)")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    ApiError::AlreadyExists("Already subscribed to this user".to_string())
                }
                sqlx::Error::Database(ref db) if db.is_check_violation() => ApiError::SelfFollow,
                other => ApiError::Database(other),
            })?;

        Ok(())
    }

    /// Remove the subscription, reporting when it was not there
    pub async fn remove(&self, follower_id: Uuid, followed_id: Uuid) -> ApiResult<()> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotPresent(
                "Not subscribed to this user".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the follower subscribes to the followed user
    pub async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> ApiResult<bool> {
        let following: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(following)
    }

    /// Which of the given users the follower subscribes to
    pub async fn followed_ids(
        &self,
        follower_id: Uuid,
        user_ids: &[Uuid],
    ) -> ApiResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT followed_id FROM follows WHERE follower_id = $1 AND followed_id = ANY($2)",
        )
        .bind(follower_id)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Get the users the follower subscribes to, most recent follow first
    pub async fn following(&self, follower_id: Uuid, paging: Paging) -> ApiResult<(Vec<User>, i64)> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                   u.password_hash, u.avatar, u.is_staff, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.followed_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(follower_id)
        .bind(i64::from(paging.limit))
        .bind(paging.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(follower_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }
}
