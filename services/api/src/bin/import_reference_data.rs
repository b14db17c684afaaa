//! Load the reference ingredient and tag catalogs into the database
//!
//! Reads `data/ingredients.json` and `data/tags.json` (paths overridable
//! via the first two arguments) and inserts rows that are not already
//! there. Safe to run repeatedly.

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::PgPool;
use std::path::Path;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    name: String,
    slug: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut args = std::env::args().skip(1);
    let ingredients_path = args.next().unwrap_or_else(|| "data/ingredients.json".to_string());
    let tags_path = args.next().unwrap_or_else(|| "data/tags.json".to_string());

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    let imported = import_ingredients(&pool, Path::new(&ingredients_path)).await?;
    info!("Imported {} ingredients from {}", imported, ingredients_path);

    let imported = import_tags(&pool, Path::new(&tags_path)).await?;
    info!("Imported {} tags from {}", imported, tags_path);

    Ok(())
}

async fn import_ingredients(pool: &PgPool, path: &Path) -> Result<u64> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<IngredientRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let mut imported = 0;
    for record in &records {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&record.name)
        .bind(&record.measurement_unit)
        .execute(pool)
        .await?;

        imported += result.rows_affected();
    }

    Ok(imported)
}

async fn import_tags(pool: &PgPool, path: &Path) -> Result<u64> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<TagRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let mut imported = 0;
    for record in &records {
        let result =
            sqlx::query("INSERT INTO tags (name, slug) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(&record.name)
                .bind(&record.slug)
                .execute(pool)
                .await?;

        imported += result.rows_affected();
    }

    Ok(imported)
}
