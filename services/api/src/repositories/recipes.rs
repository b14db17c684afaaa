//! Recipe repository for database operations
//!
//! A recipe row owns two association sets, its tag links and its ingredient
//! lines. Mutations write the row and both sets inside one transaction, and
//! updates replace the sets wholesale instead of diffing them.

use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::Paging;
use crate::models::recipe::{IngredientLineRequest, IngredientLineResponse, Recipe, RecipeRequest};

/// Filters applied to the recipe listing
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    /// Keep only recipes by this author
    pub author: Option<Uuid>,
    /// Keep only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,
    /// Keep only recipes the viewer favorited
    pub only_favorited: bool,
    /// Keep only recipes in the viewer's shopping cart
    pub only_in_cart: bool,
    /// The caller the viewer-relative filters refer to
    pub viewer: Option<Uuid>,
}

const LIST_FILTER: &str = r#"
    ($1::uuid IS NULL OR r.author_id = $1)
    AND (cardinality($2::text[]) = 0 OR EXISTS (
        SELECT 1 FROM recipe_tags rt
        JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = r.id AND t.slug = ANY($2)))
    AND (NOT $3::bool OR EXISTS (
        SELECT 1 FROM favorites f
        WHERE f.recipe_id = r.id AND f.user_id = $4))
    AND (NOT $5::bool OR EXISTS (
        SELECT 1 FROM shopping_cart sc
        WHERE sc.recipe_id = r.id AND sc.user_id = $4))
"#;

/// Recipe repository
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a recipe with its tag links and ingredient lines as one
    /// transaction
    pub async fn create(&self, author_id: Uuid, payload: &RecipeRequest) -> ApiResult<Uuid> {
        let mut tx = self.pool.begin().await?;

        let recipe_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(&payload.name)
        .bind(&payload.image)
        .bind(&payload.text)
        .bind(payload.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_tags(&mut tx, recipe_id, &payload.tags).await?;
        Self::insert_lines(&mut tx, recipe_id, &payload.ingredients).await?;

        tx.commit().await?;

        Ok(recipe_id)
    }

    /// Replace the recipe's scalar fields and both association sets as one
    /// transaction
    pub async fn replace(&self, recipe_id: Uuid, payload: &RecipeRequest) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE recipes
            SET name = $1, image = $2, text = $3, cooking_time = $4
            WHERE id = $5
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.image)
        .bind(&payload.text)
        .bind(payload.cooking_time)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        Self::link_tags(&mut tx, recipe_id, &payload.tags).await?;
        Self::insert_lines(&mut tx, recipe_id, &payload.ingredients).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn link_tags(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: Uuid,
        tag_ids: &[Uuid],
    ) -> ApiResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            SELECT $1, t.tag_id FROM UNNEST($2::uuid[]) AS t(tag_id)
            "#,
        )
        .bind(recipe_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await
        .map_err(remap_tag_violation)?;

        Ok(())
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: Uuid,
        lines: &[IngredientLineRequest],
    ) -> ApiResult<()> {
        let ingredient_ids: Vec<Uuid> = lines.iter().map(|line| line.id).collect();
        let amounts: Vec<i32> = lines.iter().map(|line| line.amount).collect();

        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            SELECT $1, line.ingredient_id, line.amount
            FROM UNNEST($2::uuid[], $3::int4[]) AS line(ingredient_id, amount)
            "#,
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut **tx)
        .await
        .map_err(remap_line_violation)?;

        Ok(())
    }

    /// Find a recipe by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, pub_date
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    /// Whether a recipe with this ID exists
    pub async fn exists(&self, id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Delete a recipe; association rows go with it
    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get recipes with filtering and pagination, newest first
    pub async fn list(
        &self,
        filters: &RecipeFilters,
        paging: Paging,
    ) -> ApiResult<(Vec<Recipe>, i64)> {
        let sql = format!(
            r#"
            SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date
            FROM recipes r
            WHERE {LIST_FILTER}
            ORDER BY r.pub_date DESC
            LIMIT $6 OFFSET $7
            "#
        );
        let recipes = sqlx::query_as::<_, Recipe>(&sql)
            .bind(filters.author)
            .bind(&filters.tag_slugs)
            .bind(filters.only_favorited)
            .bind(filters.viewer)
            .bind(filters.only_in_cart)
            .bind(i64::from(paging.limit))
            .bind(paging.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM recipes r WHERE {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filters.author)
            .bind(&filters.tag_slugs)
            .bind(filters.only_favorited)
            .bind(filters.viewer)
            .bind(filters.only_in_cart)
            .fetch_one(&self.pool)
            .await?;

        Ok((recipes, total))
    }

    /// Resolved ingredient lines for each of the given recipes
    pub async fn lines_for(
        &self,
        recipe_ids: &[Uuid],
    ) -> ApiResult<Vec<(Uuid, IngredientLineResponse)>> {
        let rows = sqlx::query(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY i.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let lines = rows
            .into_iter()
            .map(|row| {
                (
                    row.get("recipe_id"),
                    IngredientLineResponse {
                        id: row.get("id"),
                        name: row.get("name"),
                        measurement_unit: row.get("measurement_unit"),
                        amount: row.get("amount"),
                    },
                )
            })
            .collect();

        Ok(lines)
    }

    /// Every recipe by the given authors, newest first
    pub async fn by_authors(&self, author_ids: &[Uuid]) -> ApiResult<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, pub_date
            FROM recipes
            WHERE author_id = ANY($1)
            ORDER BY pub_date DESC
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    /// Recipe counts per author
    pub async fn count_by_authors(&self, author_ids: &[Uuid]) -> ApiResult<Vec<(Uuid, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT author_id, COUNT(*) AS total
            FROM recipes
            WHERE author_id = ANY($1)
            GROUP BY author_id
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|row| (row.get("author_id"), row.get("total")))
            .collect();

        Ok(counts)
    }
}

/// Race window between reference validation and the insert: attribute
/// constraint breakage to the tags field
fn remap_tag_violation(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return ApiError::DuplicateEntry { field: "tags" };
        }
        if db.is_foreign_key_violation() {
            return ApiError::InvalidField {
                field: "tags",
                message: "Tag does not exist".to_string(),
            };
        }
    }

    ApiError::Database(err)
}

/// Same as [`remap_tag_violation`], for the ingredient lines
fn remap_line_violation(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return ApiError::DuplicateEntry {
                field: "ingredients",
            };
        }
        if db.is_foreign_key_violation() {
            return ApiError::InvalidField {
                field: "ingredients",
                message: "Ingredient does not exist".to_string(),
            };
        }
    }

    ApiError::Database(err)
}
