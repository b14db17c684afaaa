//! Application state shared across handlers

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::repositories::{
    FollowRepository, IngredientRepository, RecipeListRepository, RecipeRepository, TagRepository,
    TokenRepository, UserRepository,
};
use crate::services::{RecipeService, ShoppingListService, SubscriptionService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: AppConfig,
    pub users: UserRepository,
    pub tokens: TokenRepository,
    pub tags: TagRepository,
    pub ingredients: IngredientRepository,
    pub recipe_lists: RecipeListRepository,
    pub follows: FollowRepository,
    pub recipes: RecipeService,
    pub shopping_list: ShoppingListService,
    pub subscriptions: SubscriptionService,
}

impl AppState {
    /// Wire repositories and services onto a pool
    pub fn new(db_pool: PgPool, config: AppConfig) -> Self {
        let users = UserRepository::new(db_pool.clone());
        let tokens = TokenRepository::new(db_pool.clone());
        let tags = TagRepository::new(db_pool.clone());
        let ingredients = IngredientRepository::new(db_pool.clone());
        let recipe_lists = RecipeListRepository::new(db_pool.clone());
        let follows = FollowRepository::new(db_pool.clone());
        let recipe_repository = RecipeRepository::new(db_pool.clone());

        let recipes = RecipeService::new(
            recipe_repository.clone(),
            tags.clone(),
            ingredients.clone(),
            recipe_lists.clone(),
            follows.clone(),
            users.clone(),
            config.limits,
        );
        let shopping_list = ShoppingListService::new(recipe_lists.clone());
        let subscriptions = SubscriptionService::new(follows.clone(), recipe_repository);

        Self {
            db_pool,
            config,
            users,
            tokens,
            tags,
            ingredients,
            recipe_lists,
            follows,
            recipes,
            shopping_list,
            subscriptions,
        }
    }
}
