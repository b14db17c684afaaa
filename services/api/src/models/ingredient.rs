//! Ingredient models for the API service

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ingredient entity; doubles as its API representation
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

/// Query parameters for the ingredient listing
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive substring filter on the name
    pub name: Option<String>,
}

/// One ingredient line of a recipe sitting in a shopping cart
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}
