//! Tag models for the API service

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Tag entity; doubles as its API representation
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}
