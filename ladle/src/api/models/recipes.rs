//! API request/response models for recipes.
//!
//! The list representation carries linked tag/ingredient ids only; the detail
//! representation embeds the full objects.

use crate::api::models::{ingredients::IngredientResponse, tags::TagResponse};
use crate::db::models::recipes::RecipeDBResponse;
use crate::types::{IngredientId, RecipeId, TagId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing recipes
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListRecipesQuery {
    /// Comma-separated tag ids; only recipes linked to any of them are returned
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; only recipes linked to any of them are returned
    pub ingredients: Option<String>,
}

/// Request body for creating a new recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeCreate {
    #[schema(example = "Coriander eggs on toast")]
    pub title: String,
    /// Preparation time in minutes
    pub time_minutes: i32,
    #[schema(value_type = String, example = "5.00")]
    pub price: Decimal,
    /// Optional external link to the full recipe
    pub link: Option<String>,
    /// Ids of tags to link; every id must belong to the caller
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub tags: Vec<TagId>,
    /// Ids of ingredients to link; every id must belong to the caller
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub ingredients: Vec<IngredientId>,
}

/// Request body for updating a recipe. All fields are optional; a present
/// `tags`/`ingredients` field replaces the full link set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub link: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tags: Option<Vec<TagId>>,
    #[schema(value_type = Option<Vec<String>>)]
    pub ingredients: Option<Vec<IngredientId>>,
}

/// Recipe list representation: linked tags and ingredients as ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub link: Option<String>,
    /// Storage path of the uploaded image, if any
    pub image: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub tags: Vec<TagId>,
    #[schema(value_type = Vec<String>)]
    pub ingredients: Vec<IngredientId>,
}

/// Recipe detail representation: linked tags and ingredients embedded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetailResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

/// Response for an image upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeImageResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RecipeId,
    /// Storage path of the uploaded image
    pub image: String,
}

impl From<RecipeDBResponse> for RecipeResponse {
    fn from(db: RecipeDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            time_minutes: db.time_minutes,
            price: db.price,
            link: db.link,
            image: db.image,
            tags: db.tags.into_iter().map(|t| t.id).collect(),
            ingredients: db.ingredients.into_iter().map(|i| i.id).collect(),
        }
    }
}

impl From<RecipeDBResponse> for RecipeDetailResponse {
    fn from(db: RecipeDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            time_minutes: db.time_minutes,
            price: db.price,
            link: db.link,
            image: db.image,
            tags: db.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: db.ingredients.into_iter().map(IngredientResponse::from).collect(),
        }
    }
}
