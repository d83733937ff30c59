//! Database repository for ingredients.

use crate::db::{
    errors::{DbError, Result},
    handlers::labels::{list_labels, LabelFilter, LabelTable},
    handlers::repository::Repository,
    models::ingredients::{IngredientCreateDBRequest, IngredientDBResponse, IngredientUpdateDBRequest},
};
use crate::types::{abbrev_uuid, IngredientId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Ingredient {
    pub id: IngredientId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct Ingredients<'c> {
    db: &'c mut PgConnection,
}

impl From<Ingredient> for IngredientDBResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            user_id: ingredient.user_id,
            name: ingredient.name,
            created_at: ingredient.created_at,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Ingredients<'c> {
    type CreateRequest = IngredientCreateDBRequest;
    type UpdateRequest = IngredientUpdateDBRequest;
    type Response = IngredientDBResponse;
    type Id = IngredientId;
    type Filter = LabelFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (user_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(IngredientDBResponse::from(ingredient))
    }

    #[instrument(skip(self), fields(ingredient_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(ingredient.map(IngredientDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(assigned_only = filter.assigned_only), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let ingredients: Vec<Ingredient> = list_labels(self.db, LabelTable::Ingredients, filter).await?;

        Ok(ingredients.into_iter().map(IngredientDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(ingredient_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(ingredient_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients SET name = COALESCE($2, name)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(IngredientDBResponse::from(ingredient))
    }
}

impl<'c> Ingredients<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Get an ingredient only if it belongs to the given owner
    #[instrument(skip(self), fields(ingredient_id = %abbrev_uuid(&id)), err)]
    pub async fn get_owned(&mut self, id: IngredientId, user_id: UserId) -> Result<Option<IngredientDBResponse>> {
        let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(ingredient.map(IngredientDBResponse::from))
    }
}
