//! Per-user recipe list membership (favorites and the shopping cart)
//!
//! Both lists are plain (user, recipe) join tables with the same shape, so
//! one repository serves them, keyed by [`RecipeListKind`].

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, remap_unique_violation};
use crate::models::ingredient::CartLine;

/// The two per-user recipe lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeListKind {
    Favorites,
    ShoppingCart,
}

impl RecipeListKind {
    fn table(self) -> &'static str {
        match self {
            RecipeListKind::Favorites => "favorites",
            RecipeListKind::ShoppingCart => "shopping_cart",
        }
    }

    /// Human label used in error messages
    pub fn label(self) -> &'static str {
        match self {
            RecipeListKind::Favorites => "favorites",
            RecipeListKind::ShoppingCart => "shopping cart",
        }
    }
}

/// Recipe list repository
#[derive(Clone)]
pub struct RecipeListRepository {
    pool: PgPool,
}

impl RecipeListRepository {
    /// Create a new recipe list repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a recipe to the list
    ///
    /// The insert goes straight to the table; the unique pair constraint
    /// decides who wins when two adds race.
    pub async fn add(&self, kind: RecipeListKind, user_id: Uuid, recipe_id: Uuid) -> ApiResult<()> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2)",
            kind.table()
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                remap_unique_violation(err, format!("Recipe is already in {}", kind.label()))
            })?;

        Ok(())
    }

    /// Remove a recipe from the list, reporting when it was not there
    pub async fn remove(
        &self,
        kind: RecipeListKind,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> ApiResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotPresent(format!(
                "Recipe is not in {}",
                kind.label()
            )));
        }

        Ok(())
    }

    /// Which of the given recipes sit in the user's list
    pub async fn member_ids(
        &self,
        kind: RecipeListKind,
        user_id: Uuid,
        recipe_ids: &[Uuid],
    ) -> ApiResult<HashSet<Uuid>> {
        let sql = format!(
            "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = ANY($2)",
            kind.table()
        );

        let ids: Vec<Uuid> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(recipe_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Ingredient lines of every recipe in the user's shopping cart
    pub async fn cart_lines(&self, user_id: Uuid) -> ApiResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM shopping_cart sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
