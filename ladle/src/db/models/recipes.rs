//! Database models for recipes.

use crate::db::models::{ingredients::IngredientDBResponse, tags::TagDBResponse};
use crate::types::{IngredientId, RecipeId, TagId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Database request for creating a new recipe
#[derive(Debug, Clone)]
pub struct RecipeCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientId>,
}

/// Database request for updating a recipe
///
/// Scalar fields left as `None` are not touched. When `tags` or `ingredients`
/// is present the full link set is replaced.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdateDBRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientId>>,
}

/// Database response for a recipe, with its linked tags and ingredients resolved
#[derive(Debug, Clone)]
pub struct RecipeDBResponse {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<TagDBResponse>,
    pub ingredients: Vec<IngredientDBResponse>,
}

impl fmt::Display for RecipeDBResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
