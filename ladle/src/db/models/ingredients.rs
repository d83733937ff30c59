//! Database models for ingredients.

use crate::types::{IngredientId, UserId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Database request for creating a new ingredient
#[derive(Debug, Clone)]
pub struct IngredientCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
}

/// Database request for renaming an ingredient
#[derive(Debug, Clone, Default)]
pub struct IngredientUpdateDBRequest {
    pub name: Option<String>,
}

/// Database response for an ingredient
#[derive(Debug, Clone)]
pub struct IngredientDBResponse {
    pub id: IngredientId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for IngredientDBResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
