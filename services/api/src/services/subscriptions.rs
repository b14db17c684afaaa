//! Subscription service: followed-author cards with recipe previews

use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::recipe::ShortRecipeResponse;
use crate::models::user::{FollowedUserResponse, User, UserResponse};
use crate::models::{Page, Paging};
use crate::repositories::{FollowRepository, RecipeRepository};
use crate::validation;

/// Subscription service
#[derive(Clone)]
pub struct SubscriptionService {
    follows: FollowRepository,
    recipes: RecipeRepository,
}

impl SubscriptionService {
    /// Create a new subscription service
    pub fn new(follows: FollowRepository, recipes: RecipeRepository) -> Self {
        Self { follows, recipes }
    }

    /// Subscribe the caller to the author and return the author's card
    pub async fn subscribe(
        &self,
        caller: &User,
        author: &User,
        recipes_limit: Option<u32>,
    ) -> ApiResult<FollowedUserResponse> {
        validation::validate_not_self(caller.id, author.id)?;

        self.follows.add(caller.id, author.id).await?;
        info!("User {} subscribed to {}", caller.id, author.id);

        let mut cards = self
            .cards(std::slice::from_ref(author), recipes_limit)
            .await?;
        cards
            .pop()
            .ok_or_else(|| ApiError::Internal("card assembly dropped the author".to_string()))
    }

    /// Unsubscribe, reporting when there was no subscription
    pub async fn unsubscribe(&self, caller: &User, author_id: Uuid) -> ApiResult<()> {
        self.follows.remove(caller.id, author_id).await?;
        info!("User {} unsubscribed from {}", caller.id, author_id);

        Ok(())
    }

    /// Page of authors the caller follows, each with a recipe preview
    pub async fn list(
        &self,
        caller: &User,
        paging: Paging,
        recipes_limit: Option<u32>,
    ) -> ApiResult<Page<FollowedUserResponse>> {
        let (authors, total) = self.follows.following(caller.id, paging).await?;
        let items = self.cards(&authors, recipes_limit).await?;

        Ok(Page {
            items,
            page: paging.page,
            limit: paging.limit,
            total,
        })
    }

    /// Assemble followed-author cards
    ///
    /// `recipes_limit` truncates each preview, but `recipes_count` always
    /// reports the author's full total. These are cards for authors the
    /// caller follows, so `is_subscribed` is true by construction.
    async fn cards(
        &self,
        authors: &[User],
        recipes_limit: Option<u32>,
    ) -> ApiResult<Vec<FollowedUserResponse>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<Uuid> = authors.iter().map(|author| author.id).collect();

        let mut recipes_by_author: HashMap<Uuid, Vec<ShortRecipeResponse>> = HashMap::new();
        for recipe in self.recipes.by_authors(&author_ids).await? {
            recipes_by_author
                .entry(recipe.author_id)
                .or_default()
                .push(ShortRecipeResponse::from_recipe(&recipe));
        }

        if let Some(limit) = recipes_limit {
            for recipes in recipes_by_author.values_mut() {
                recipes.truncate(limit as usize);
            }
        }

        let counts: HashMap<Uuid, i64> = self
            .recipes
            .count_by_authors(&author_ids)
            .await?
            .into_iter()
            .collect();

        let mut cards = Vec::with_capacity(authors.len());
        for author in authors {
            cards.push(FollowedUserResponse {
                user: UserResponse::from_user(author, true),
                recipes: recipes_by_author.remove(&author.id).unwrap_or_default(),
                recipes_count: counts.get(&author.id).copied().unwrap_or(0),
            });
        }

        Ok(cards)
    }
}
