//! Database repository for tags.

use crate::db::{
    errors::{DbError, Result},
    handlers::labels::{list_labels, LabelFilter, LabelTable},
    handlers::repository::Repository,
    models::tags::{TagCreateDBRequest, TagDBResponse, TagUpdateDBRequest},
};
use crate::types::{abbrev_uuid, TagId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct Tags<'c> {
    db: &'c mut PgConnection,
}

impl From<Tag> for TagDBResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            user_id: tag.user_id,
            name: tag.name,
            created_at: tag.created_at,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Tags<'c> {
    type CreateRequest = TagCreateDBRequest;
    type UpdateRequest = TagUpdateDBRequest;
    type Response = TagDBResponse;
    type Id = TagId;
    type Filter = LabelFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(TagDBResponse::from(tag))
    }

    #[instrument(skip(self), fields(tag_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tag.map(TagDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(assigned_only = filter.assigned_only), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let tags: Vec<Tag> = list_labels(self.db, LabelTable::Tags, filter).await?;

        Ok(tags.into_iter().map(TagDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(tag_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(tag_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags SET name = COALESCE($2, name)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(TagDBResponse::from(tag))
    }
}

impl<'c> Tags<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Get a tag only if it belongs to the given owner
    #[instrument(skip(self), fields(tag_id = %abbrev_uuid(&id)), err)]
    pub async fn get_owned(&mut self, id: TagId, user_id: UserId) -> Result<Option<TagDBResponse>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tag.map(TagDBResponse::from))
    }
}
