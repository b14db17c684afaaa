//! Auth token repository for database operations
//!
//! Tokens are opaque random keys; a user holds at most one at a time.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::user::User;

/// Length of issued token keys
const TOKEN_KEY_LEN: usize = 40;

/// Token repository
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue a token for the user, or hand back the one already issued
    pub async fn issue(&self, user_id: Uuid) -> ApiResult<String> {
        let fresh = generate_key();

        // The no-op update makes ON CONFLICT return the existing row.
        let key: String = sqlx::query_scalar(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET key = auth_tokens.key
            RETURNING key
            "#,
        )
        .bind(&fresh)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Issued token for user {}", user_id);

        Ok(key)
    }

    /// Resolve a presented token key to its user
    pub async fn resolve(&self, key: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                   u.password_hash, u.avatar, u.is_staff, u.created_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Drop every token the user holds
    pub async fn revoke_all(&self, user_id: Uuid) -> ApiResult<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("Revoked tokens for user {}", user_id);

        Ok(())
    }
}

/// Generate a fresh random token key
fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_KEY_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_shape() {
        let key = generate_key();
        assert_eq!(key.len(), TOKEN_KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_key_is_not_constant() {
        assert_ne!(generate_key(), generate_key());
    }
}
