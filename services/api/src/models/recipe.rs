//! Recipe models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::tag::Tag;
use crate::models::user::UserResponse;

/// Recipe entity as stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// One ingredient line in a create/update payload
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientLineRequest {
    pub id: Uuid,
    pub amount: i32,
}

/// Request for creating or updating a recipe
///
/// Updates carry the full payload; tag and ingredient sets always replace
/// what was stored before.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRequest {
    pub ingredients: Vec<IngredientLineRequest>,
    pub tags: Vec<Uuid>,
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Ingredient line resolved against the ingredient catalog
#[derive(Debug, Clone, Serialize)]
pub struct IngredientLineResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe representation, annotated relative to the caller
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

/// Abbreviated recipe representation used by toggles and author cards
#[derive(Debug, Clone, Serialize)]
pub struct ShortRecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Query parameters for the recipe listing
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Filter by author id
    pub author: Option<Uuid>,
    /// Filter by tag slugs; repeated keys accumulate
    #[serde(default)]
    pub tags: Vec<String>,
    /// Keep only recipes the caller favorited
    #[serde(default, deserialize_with = "flag")]
    pub is_favorited: Option<bool>,
    /// Keep only recipes in the caller's shopping cart
    #[serde(default, deserialize_with = "flag")]
    pub is_in_shopping_cart: Option<bool>,
}

/// Boolean query flag that also accepts the numeric form ("1"/"0")
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|value| matches!(value.as_str(), "1" | "true" | "True")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "flag")]
        value: Option<bool>,
    }

    #[test]
    fn test_flag_accepts_numeric_and_text_forms() {
        let probe: Probe = serde_json::from_value(json!({ "value": "1" })).unwrap();
        assert_eq!(probe.value, Some(true));

        let probe: Probe = serde_json::from_value(json!({ "value": "true" })).unwrap();
        assert_eq!(probe.value, Some(true));

        let probe: Probe = serde_json::from_value(json!({ "value": "0" })).unwrap();
        assert_eq!(probe.value, Some(false));

        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(probe.value, None);
    }
}
