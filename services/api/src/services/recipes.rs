//! Recipe service: validation, authorization, and hydration around the
//! recipe repositories
//!
//! Validation runs before any write so a rejected payload leaves storage
//! untouched. Hydration resolves a page of recipe rows into their full
//! representations with a fixed number of queries, whatever the page size.

use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

use crate::config::QuantityLimits;
use crate::error::{ApiError, ApiResult};
use crate::models::recipe::{
    Recipe, RecipeQuery, RecipeRequest, RecipeResponse, ShortRecipeResponse,
};
use crate::models::tag::Tag;
use crate::models::user::{User, UserResponse};
use crate::models::{Page, Paging};
use crate::repositories::{
    FollowRepository, IngredientRepository, RecipeFilters, RecipeListKind, RecipeListRepository,
    RecipeRepository, TagRepository, UserRepository,
};
use crate::validation;

/// Recipe service
#[derive(Clone)]
pub struct RecipeService {
    recipes: RecipeRepository,
    tags: TagRepository,
    ingredients: IngredientRepository,
    lists: RecipeListRepository,
    follows: FollowRepository,
    users: UserRepository,
    limits: QuantityLimits,
}

impl RecipeService {
    /// Create a new recipe service
    pub fn new(
        recipes: RecipeRepository,
        tags: TagRepository,
        ingredients: IngredientRepository,
        lists: RecipeListRepository,
        follows: FollowRepository,
        users: UserRepository,
        limits: QuantityLimits,
    ) -> Self {
        Self {
            recipes,
            tags,
            ingredients,
            lists,
            follows,
            users,
            limits,
        }
    }

    /// Create a recipe and return its full representation
    pub async fn create(&self, author: &User, payload: &RecipeRequest) -> ApiResult<RecipeResponse> {
        self.validate(payload)?;
        self.resolve_references(payload).await?;

        let recipe_id = self.recipes.create(author.id, payload).await?;
        info!("User {} created recipe {}", author.id, recipe_id);

        self.detail(recipe_id, Some(author)).await
    }

    /// Update a recipe, replacing its tag and ingredient sets wholesale
    pub async fn update(
        &self,
        caller: &User,
        recipe_id: Uuid,
        payload: &RecipeRequest,
    ) -> ApiResult<RecipeResponse> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::NotFound("Recipe"))?;
        authorize_author(caller, &recipe)?;

        self.validate(payload)?;
        self.resolve_references(payload).await?;

        self.recipes.replace(recipe_id, payload).await?;
        info!("User {} updated recipe {}", caller.id, recipe_id);

        self.detail(recipe_id, Some(caller)).await
    }

    /// Delete a recipe
    pub async fn delete(&self, caller: &User, recipe_id: Uuid) -> ApiResult<()> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::NotFound("Recipe"))?;
        authorize_author(caller, &recipe)?;

        self.recipes.delete(recipe_id).await?;
        info!("User {} deleted recipe {}", caller.id, recipe_id);

        Ok(())
    }

    /// Full representation of one recipe
    pub async fn detail(&self, recipe_id: Uuid, viewer: Option<&User>) -> ApiResult<RecipeResponse> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::NotFound("Recipe"))?;

        let mut hydrated = self.hydrate(vec![recipe], viewer).await?;
        hydrated
            .pop()
            .ok_or_else(|| ApiError::Internal("hydration dropped the recipe".to_string()))
    }

    /// Abbreviated representation of one recipe
    pub async fn short(&self, recipe_id: Uuid) -> ApiResult<ShortRecipeResponse> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::NotFound("Recipe"))?;

        Ok(ShortRecipeResponse::from_recipe(&recipe))
    }

    /// Whether a recipe with this ID exists
    pub async fn exists(&self, recipe_id: Uuid) -> ApiResult<bool> {
        self.recipes.exists(recipe_id).await
    }

    /// Filtered page of recipes, newest first
    ///
    /// The viewer-relative filters are skipped for anonymous callers
    /// instead of failing.
    pub async fn list(
        &self,
        viewer: Option<&User>,
        query: &RecipeQuery,
        paging: Paging,
    ) -> ApiResult<Page<RecipeResponse>> {
        let filters = RecipeFilters {
            author: query.author,
            tag_slugs: query.tags.clone(),
            only_favorited: viewer.is_some() && query.is_favorited == Some(true),
            only_in_cart: viewer.is_some() && query.is_in_shopping_cart == Some(true),
            viewer: viewer.map(|user| user.id),
        };

        let (recipes, total) = self.recipes.list(&filters, paging).await?;
        let items = self.hydrate(recipes, viewer).await?;

        Ok(Page {
            items,
            page: paging.page,
            limit: paging.limit,
            total,
        })
    }

    fn validate(&self, payload: &RecipeRequest) -> ApiResult<()> {
        validation::validate_name(&payload.name)
            .map_err(|message| ApiError::InvalidField {
                field: "name",
                message,
            })?;
        if payload.text.trim().is_empty() {
            return Err(ApiError::EmptyField { field: "text" });
        }

        validation::validate_items(&payload.tags, "tags")?;
        let ingredient_ids: Vec<Uuid> = payload.ingredients.iter().map(|line| line.id).collect();
        validation::validate_items(&ingredient_ids, "ingredients")?;

        for line in &payload.ingredients {
            validation::validate_amount(line.amount, &self.limits)?;
        }
        validation::validate_cooking_time(payload.cooking_time, &self.limits)?;

        Ok(())
    }

    async fn resolve_references(&self, payload: &RecipeRequest) -> ApiResult<()> {
        self.tags.require_all(&payload.tags, "tags").await?;

        let ingredient_ids: Vec<Uuid> = payload.ingredients.iter().map(|line| line.id).collect();
        self.ingredients
            .require_all(&ingredient_ids, "ingredients")
            .await?;

        Ok(())
    }

    /// Resolve associations and viewer-relative flags for a page of recipes
    async fn hydrate(
        &self,
        recipes: Vec<Recipe>,
        viewer: Option<&User>,
    ) -> ApiResult<Vec<RecipeResponse>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<Uuid> = recipes.iter().map(|recipe| recipe.id).collect();
        let mut author_ids: Vec<Uuid> = recipes.iter().map(|recipe| recipe.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for (recipe_id, tag) in self.tags.for_recipes(&recipe_ids).await? {
            tags_by_recipe.entry(recipe_id).or_default().push(tag);
        }

        let mut lines_by_recipe: HashMap<Uuid, Vec<_>> = HashMap::new();
        for (recipe_id, line) in self.recipes.lines_for(&recipe_ids).await? {
            lines_by_recipe.entry(recipe_id).or_default().push(line);
        }

        let authors: HashMap<Uuid, User> = self
            .users
            .by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let (favorited, in_cart, followed) = match viewer {
            Some(viewer) => (
                self.lists
                    .member_ids(RecipeListKind::Favorites, viewer.id, &recipe_ids)
                    .await?,
                self.lists
                    .member_ids(RecipeListKind::ShoppingCart, viewer.id, &recipe_ids)
                    .await?,
                self.follows.followed_ids(viewer.id, &author_ids).await?,
            ),
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        let mut responses = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            let author = authors.get(&recipe.author_id).ok_or_else(|| {
                ApiError::Internal(format!(
                    "author {} missing for recipe {}",
                    recipe.author_id, recipe.id
                ))
            })?;

            responses.push(RecipeResponse {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author: UserResponse::from_user(author, followed.contains(&author.id)),
                ingredients: lines_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            });
        }

        Ok(responses)
    }
}

/// Only the author or staff may change a recipe
fn authorize_author(caller: &User, recipe: &Recipe) -> ApiResult<()> {
    if caller.id == recipe.author_id || caller.is_staff {
        return Ok(());
    }

    Err(ApiError::PermissionDenied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(is_staff: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "chef".to_string(),
            email: "chef@example.com".to_string(),
            first_name: "Amari".to_string(),
            last_name: "Okafor".to_string(),
            password_hash: String::new(),
            avatar: None,
            is_staff,
            created_at: Utc::now(),
        }
    }

    fn sample_recipe(author_id: Uuid) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            author_id,
            name: "Pho".to_string(),
            image: None,
            text: "Simmer the broth".to_string(),
            cooking_time: 90,
            pub_date: Utc::now(),
        }
    }

    #[test]
    fn test_author_may_change_own_recipe() {
        let author = sample_user(false);
        let recipe = sample_recipe(author.id);

        assert!(authorize_author(&author, &recipe).is_ok());
    }

    #[test]
    fn test_other_users_are_rejected() {
        let author = sample_user(false);
        let stranger = sample_user(false);
        let recipe = sample_recipe(author.id);

        assert!(matches!(
            authorize_author(&stranger, &recipe),
            Err(ApiError::PermissionDenied)
        ));
    }

    #[test]
    fn test_staff_may_change_any_recipe() {
        let author = sample_user(false);
        let admin = sample_user(true);
        let recipe = sample_recipe(author.id);

        assert!(authorize_author(&admin, &recipe).is_ok());
    }
}
