//! Domain services coordinating validation, storage, and presentation

pub mod recipes;
pub mod shopping_list;
pub mod subscriptions;

pub use recipes::RecipeService;
pub use shopping_list::ShoppingListService;
pub use subscriptions::SubscriptionService;
