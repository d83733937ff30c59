//! API request/response models for ingredients.

use crate::db::models::ingredients::IngredientDBResponse;
use crate::types::IngredientId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing ingredients
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListIngredientsQuery {
    /// Set to 1 to return only ingredients assigned to at least one recipe
    #[param(example = 1)]
    pub assigned_only: Option<u8>,
}

/// Request body for creating a new ingredient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientCreate {
    #[schema(example = "Cucumber")]
    pub name: String,
}

/// Request body for renaming an ingredient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientUpdate {
    pub name: Option<String>,
}

/// Ingredient details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct IngredientResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: IngredientId,
    pub name: String,
}

impl From<IngredientDBResponse> for IngredientResponse {
    fn from(db: IngredientDBResponse) -> Self {
        Self { id: db.id, name: db.name }
    }
}
