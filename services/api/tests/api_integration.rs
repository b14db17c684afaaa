//! End-to-end tests for the recipe platform services
//!
//! These tests run the real services against a live PostgreSQL database,
//! so they are ignored by default; run them with `cargo test -- --ignored`
//! after pointing DATABASE_URL at a disposable database.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

use api::{
    config::AppConfig,
    error::ApiError,
    models::clamp_paging,
    models::recipe::{IngredientLineRequest, RecipeRequest},
    models::user::{CreateUserRequest, User},
    repositories::RecipeListKind,
    routes::create_router,
    state::AppState,
};
use common::database::{DatabaseConfig, init_pool};

async fn setup() -> AppState {
    let db_config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&db_config).await.expect("database pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    AppState::new(pool, AppConfig::from_env())
}

/// Short random suffix keeping test fixtures apart across runs
fn suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn register_user(state: &AppState) -> User {
    let s = suffix();
    state
        .users
        .create(&CreateUserRequest {
            email: format!("cook-{s}@example.com"),
            username: format!("cook-{s}"),
            first_name: "Test".to_string(),
            last_name: "Cook".to_string(),
            password: "soup-and-bread".to_string(),
        })
        .await
        .expect("user registration")
}

async fn create_tag(state: &AppState) -> Uuid {
    let s = suffix();
    sqlx::query_scalar("INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id")
        .bind(format!("tag-{s}"))
        .bind(format!("tag-{s}"))
        .fetch_one(&state.db_pool)
        .await
        .expect("tag fixture")
}

async fn create_ingredient(state: &AppState, name: &str, unit: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(&state.db_pool)
    .await
    .expect("ingredient fixture")
}

fn recipe_payload(name: &str, tags: Vec<Uuid>, lines: Vec<(Uuid, i32)>) -> RecipeRequest {
    RecipeRequest {
        ingredients: lines
            .into_iter()
            .map(|(id, amount)| IngredientLineRequest { id, amount })
            .collect(),
        tags,
        image: None,
        name: name.to_string(),
        text: "Combine everything and simmer.".to_string(),
        cooking_time: 30,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_create_then_read_round_trips_sets() {
    let state = setup().await;
    let author = register_user(&state).await;

    let s = suffix();
    let tag_a = create_tag(&state).await;
    let tag_b = create_tag(&state).await;
    let flour = create_ingredient(&state, &format!("flour-{s}"), "g").await;
    let salt = create_ingredient(&state, &format!("salt-{s}"), "g").await;

    let payload = recipe_payload("Bread", vec![tag_a, tag_b], vec![(flour, 500), (salt, 10)]);
    let created = state.recipes.create(&author, &payload).await.expect("create");

    let detail = state
        .recipes
        .detail(created.id, Some(&author))
        .await
        .expect("detail");

    let mut tag_ids: Vec<Uuid> = detail.tags.iter().map(|tag| tag.id).collect();
    tag_ids.sort();
    let mut expected_tags = vec![tag_a, tag_b];
    expected_tags.sort();
    assert_eq!(tag_ids, expected_tags);

    let mut lines: Vec<(Uuid, i32)> = detail
        .ingredients
        .iter()
        .map(|line| (line.id, line.amount))
        .collect();
    lines.sort();
    let mut expected_lines = vec![(flour, 500), (salt, 10)];
    expected_lines.sort();
    assert_eq!(lines, expected_lines);

    assert!(!detail.is_favorited);
    assert!(!detail.is_in_shopping_cart);
    assert_eq!(detail.author.id, author.id);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_update_replaces_sets_and_is_idempotent() {
    let state = setup().await;
    let author = register_user(&state).await;

    let s = suffix();
    let tag_a = create_tag(&state).await;
    let tag_b = create_tag(&state).await;
    let flour = create_ingredient(&state, &format!("flour-{s}"), "g").await;
    let milk = create_ingredient(&state, &format!("milk-{s}"), "ml").await;

    let created = state
        .recipes
        .create(&author, &recipe_payload("Dough", vec![tag_a], vec![(flour, 300)]))
        .await
        .expect("create");

    let update = recipe_payload("Batter", vec![tag_b], vec![(milk, 200)]);
    let first = state
        .recipes
        .update(&author, created.id, &update)
        .await
        .expect("first update");
    let second = state
        .recipes
        .update(&author, created.id, &update)
        .await
        .expect("second update");

    for updated in [&first, &second] {
        assert_eq!(updated.name, "Batter");
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].id, tag_b);
        assert_eq!(updated.ingredients.len(), 1);
        assert_eq!(updated.ingredients[0].id, milk);
        assert_eq!(updated.ingredients[0].amount, 200);
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_non_author_update_is_rejected() {
    let state = setup().await;
    let author = register_user(&state).await;
    let stranger = register_user(&state).await;

    let s = suffix();
    let tag = create_tag(&state).await;
    let flour = create_ingredient(&state, &format!("flour-{s}"), "g").await;

    let payload = recipe_payload("Bread", vec![tag], vec![(flour, 500)]);
    let created = state.recipes.create(&author, &payload).await.expect("create");

    let result = state.recipes.update(&stranger, created.id, &payload).await;
    assert!(matches!(result, Err(ApiError::PermissionDenied)));

    let result = state.recipes.update(&author, created.id, &payload).await;
    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_favorite_toggle_sequences() {
    let state = setup().await;
    let author = register_user(&state).await;
    let fan = register_user(&state).await;

    let s = suffix();
    let tag = create_tag(&state).await;
    let flour = create_ingredient(&state, &format!("flour-{s}"), "g").await;
    let recipe = state
        .recipes
        .create(&author, &recipe_payload("Bread", vec![tag], vec![(flour, 500)]))
        .await
        .expect("create");

    let kind = RecipeListKind::Favorites;

    state
        .recipe_lists
        .add(kind, fan.id, recipe.id)
        .await
        .expect("first add");
    let result = state.recipe_lists.add(kind, fan.id, recipe.id).await;
    assert!(matches!(result, Err(ApiError::AlreadyExists(_))));

    state
        .recipe_lists
        .remove(kind, fan.id, recipe.id)
        .await
        .expect("remove");
    let result = state.recipe_lists.remove(kind, fan.id, recipe.id).await;
    assert!(matches!(result, Err(ApiError::NotPresent(_))));

    state
        .recipe_lists
        .add(kind, fan.id, recipe.id)
        .await
        .expect("add after remove");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_shopping_list_sums_across_recipes() {
    let state = setup().await;
    let author = register_user(&state).await;
    let shopper = register_user(&state).await;

    let s = suffix();
    let tag = create_tag(&state).await;
    let flour_name = format!("aa-flour-{s}");
    let salt_name = format!("zz-salt-{s}");
    let flour = create_ingredient(&state, &flour_name, "g").await;
    let salt = create_ingredient(&state, &salt_name, "g").await;

    let bread = state
        .recipes
        .create(
            &author,
            &recipe_payload("Bread", vec![tag], vec![(flour, 200), (salt, 5)]),
        )
        .await
        .expect("bread");
    let pancakes = state
        .recipes
        .create(&author, &recipe_payload("Pancakes", vec![tag], vec![(flour, 300)]))
        .await
        .expect("pancakes");

    for recipe_id in [bread.id, pancakes.id] {
        state
            .recipe_lists
            .add(RecipeListKind::ShoppingCart, shopper.id, recipe_id)
            .await
            .expect("cart add");
    }

    let (filename, report) = state.shopping_list.build(&shopper).await.expect("report");
    assert_eq!(filename, format!("{}_shopping_cart.txt", shopper.username));
    assert_eq!(
        report,
        format!("{flour_name} (g) — 500\n{salt_name} (g) — 5")
    );

    let empty_handed = register_user(&state).await;
    let (_, report) = state
        .shopping_list
        .build(&empty_handed)
        .await
        .expect("empty report");
    assert_eq!(report, "");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_avatar_put_responds_created() {
    let state = setup().await;
    let user = register_user(&state).await;
    let token = state.tokens.issue(user.id).await.expect("token");

    let app = create_router(state);
    let request = Request::builder()
        .method("PUT")
        .uri("/api/users/me/avatar/")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"avatar": "avatars/cook.png"}"#))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(value["avatar"], "avatars/cook.png");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_ingredient_name_filter_matches_substrings() {
    let state = setup().await;

    let s = suffix();
    let name = format!("whole-wheat-flour-{s}");
    create_ingredient(&state, &name, "g").await;

    // An interior, differently-cased fragment must match, not just a prefix.
    let found = state
        .ingredients
        .list(Some(&format!("WHEAT-FLOUR-{s}")))
        .await
        .expect("filtered listing");
    assert!(found.iter().any(|ingredient| ingredient.name == name));

    let found = state
        .ingredients
        .list(Some(&format!("no-such-ingredient-{s}")))
        .await
        .expect("empty listing");
    assert!(found.is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_subscription_toggles_and_listing() {
    let state = setup().await;
    let follower = register_user(&state).await;
    let author = register_user(&state).await;

    let result = state.subscriptions.subscribe(&follower, &follower, None).await;
    assert!(matches!(result, Err(ApiError::SelfFollow)));

    let s = suffix();
    let tag = create_tag(&state).await;
    let flour = create_ingredient(&state, &format!("flour-{s}"), "g").await;
    for name in ["Bread", "Pancakes"] {
        state
            .recipes
            .create(&author, &recipe_payload(name, vec![tag], vec![(flour, 100)]))
            .await
            .expect("recipe");
    }

    let card = state
        .subscriptions
        .subscribe(&follower, &author, Some(1))
        .await
        .expect("subscribe");
    assert!(card.user.is_subscribed);
    assert_eq!(card.recipes.len(), 1);
    assert_eq!(card.recipes_count, 2);

    let result = state.subscriptions.subscribe(&follower, &author, None).await;
    assert!(matches!(result, Err(ApiError::AlreadyExists(_))));

    let paging = clamp_paging(None, None, 6);
    let page = state
        .subscriptions
        .list(&follower, paging, None)
        .await
        .expect("listing");
    assert!(page.items.iter().any(|card| card.user.id == author.id));

    state
        .subscriptions
        .unsubscribe(&follower, author.id)
        .await
        .expect("unsubscribe");
    let result = state.subscriptions.unsubscribe(&follower, author.id).await;
    assert!(matches!(result, Err(ApiError::NotPresent(_))));
}
