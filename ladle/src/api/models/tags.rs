//! API request/response models for tags.

use crate::db::models::tags::TagDBResponse;
use crate::types::TagId;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing tags
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListTagsQuery {
    /// Set to 1 to return only tags assigned to at least one recipe
    #[param(example = 1)]
    pub assigned_only: Option<u8>,
}

/// Request body for creating a new tag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagCreate {
    #[schema(example = "Vegan")]
    pub name: String,
}

/// Request body for renaming a tag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagUpdate {
    pub name: Option<String>,
}

/// Tag details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TagResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TagId,
    pub name: String,
}

impl From<TagDBResponse> for TagResponse {
    fn from(db: TagDBResponse) -> Self {
        Self { id: db.id, name: db.name }
    }
}
