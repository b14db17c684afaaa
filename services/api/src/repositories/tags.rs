//! Tag repository for database operations

use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::tag::Tag;

/// Tag repository
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get all tags ordered by name
    pub async fn list(&self) -> ApiResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(tags)
    }

    /// Find a tag by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    /// Check that every id resolves to a tag, reporting the first that does not
    pub async fn require_all(&self, ids: &[Uuid], field: &'static str) -> ApiResult<()> {
        let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
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

    /// Tags linked to each of the given recipes
    pub async fn for_recipes(&self, recipe_ids: &[Uuid]) -> ApiResult<Vec<(Uuid, Tag)>> {
        let rows = sqlx::query(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let tags = rows
            .into_iter()
            .map(|row| {
                (
                    row.get("recipe_id"),
                    Tag {
                        id: row.get("id"),
                        name: row.get("name"),
                        slug: row.get("slug"),
                    },
                )
            })
            .collect();

        Ok(tags)
    }
}
