//! Ingredient repository for database operations

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::ingredient::Ingredient;

/// Ingredient repository
#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    /// Create a new ingredient repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get ingredients ordered by name, optionally filtered by a
    /// case-insensitive substring of the name
    pub async fn list(&self, name: Option<&str>) -> ApiResult<Vec<Ingredient>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(ingredients)
    }

    /// Find an ingredient by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Ingredient>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ingredient)
    }

    /// Check that every id resolves to an ingredient, reporting the first
    /// that does not
    pub async fn require_all(&self, ids: &[Uuid], field: &'static str) -> ApiResult<()> {
        let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        let found: HashSet<Uuid> = found.into_iter().collect();

        for id in ids {
            if !found.contains(id) {
                return Err(ApiError::UnknownEntry { field, id: *id });
            }
        }

        Ok(())
    }
}
