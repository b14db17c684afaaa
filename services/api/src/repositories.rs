//! Repositories for database operations
//!
//! Every persistence call lives behind one of these repositories; the
//! service and route layers never touch SQL directly.

pub mod follows;
pub mod ingredients;
pub mod recipe_lists;
pub mod recipes;
pub mod tags;
pub mod tokens;
pub mod users;

pub use follows::FollowRepository;
pub use ingredients::IngredientRepository;
pub use recipe_lists::{RecipeListKind, RecipeListRepository};
pub use recipes::{RecipeFilters, RecipeRepository};
pub use tags::TagRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;
