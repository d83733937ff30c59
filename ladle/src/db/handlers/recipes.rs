//! Database repository for recipes and their tag/ingredient links.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::{
        ingredients::IngredientDBResponse,
        recipes::{RecipeCreateDBRequest, RecipeDBResponse, RecipeUpdateDBRequest},
        tags::TagDBResponse,
    },
};
use crate::types::{abbrev_uuid, IngredientId, RecipeId, TagId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, FromRow, PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing recipes
#[derive(Debug, Clone)]
pub struct RecipeFilter {
    pub user_id: UserId,
    /// Restrict to recipes linked to any of these tags
    pub tags: Option<Vec<TagId>>,
    /// Restrict to recipes linked to any of these ingredients
    pub ingredients: Option<Vec<IngredientId>>,
}

impl RecipeFilter {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            tags: None,
            ingredients: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<IngredientId>) -> Self {
        self.ingredients = Some(ingredients);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
struct Recipe {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Link table rows joined with their label, keyed back to the recipe
#[derive(Debug, Clone, FromRow)]
struct LinkedTag {
    pub recipe_id: RecipeId,
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct LinkedIngredient {
    pub recipe_id: RecipeId,
    pub id: IngredientId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct Recipes<'c> {
    db: &'c mut PgConnection,
}

impl Recipe {
    fn into_response(self, tags: Vec<TagDBResponse>, ingredients: Vec<IngredientDBResponse>) -> RecipeDBResponse {
        RecipeDBResponse {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tags,
            ingredients,
        }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Recipes<'c> {
    type CreateRequest = RecipeCreateDBRequest;
    type UpdateRequest = RecipeUpdateDBRequest;
    type Response = RecipeDBResponse;
    type Id = RecipeId;
    type Filter = RecipeFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.title)
        .bind(request.time_minutes)
        .bind(request.price)
        .bind(&request.link)
        .fetch_one(&mut *tx)
        .await?;

        replace_tag_links(&mut *tx, recipe.id, request.user_id, &request.tags).await?;
        replace_ingredient_links(&mut *tx, recipe.id, request.user_id, &request.ingredients).await?;

        tx.commit().await?;

        let tags = self.get_recipe_tags(recipe.id).await?;
        let ingredients = self.get_recipe_ingredients(recipe.id).await?;

        Ok(recipe.into_response(tags, ingredients))
    }

    #[instrument(skip(self), fields(recipe_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match recipe {
            Some(recipe) => {
                let tags = self.get_recipe_tags(recipe.id).await?;
                let ingredients = self.get_recipe_ingredients(recipe.id).await?;
                Ok(Some(recipe.into_response(tags, ingredients)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), fields(user_id = %abbrev_uuid(&filter.user_id)), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT r.* FROM recipes r WHERE r.user_id = ");
        query.push_bind(filter.user_id);

        if let Some(ref tags) = filter.tags {
            query.push(" AND EXISTS (SELECT 1 FROM recipe_tags rt WHERE rt.recipe_id = r.id AND rt.tag_id = ANY(");
            query.push_bind(tags.clone());
            query.push("))");
        }

        if let Some(ref ingredients) = filter.ingredients {
            query.push(" AND EXISTS (SELECT 1 FROM recipe_ingredients ri WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY(");
            query.push_bind(ingredients.clone());
            query.push("))");
        }

        query.push(" ORDER BY r.created_at DESC");

        let recipes = query.build_query_as::<Recipe>().fetch_all(&mut *self.db).await?;

        // Resolve links in bulk to avoid a query pair per recipe
        let recipe_ids: Vec<RecipeId> = recipes.iter().map(|r| r.id).collect();
        let mut tags_map = self.get_recipes_tags_bulk(&recipe_ids).await?;
        let mut ingredients_map = self.get_recipes_ingredients_bulk(&recipe_ids).await?;

        Ok(recipes
            .into_iter()
            .map(|recipe| {
                let tags = tags_map.remove(&recipe.id).unwrap_or_default();
                let ingredients = ingredients_map.remove(&recipe.id).unwrap_or_default();
                recipe.into_response(tags, ingredients)
            })
            .collect())
    }

    #[instrument(skip(self), fields(recipe_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(recipe_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        // Atomic update with conditional field updates
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes SET
                title = COALESCE($2, title),
                time_minutes = COALESCE($3, time_minutes),
                price = COALESCE($4, price),
                link = COALESCE($5, link),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(request.time_minutes)
        .bind(request.price)
        .bind(&request.link)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        // When a link set is present in the update it replaces the stored set
        if let Some(ref tags) = request.tags {
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            replace_tag_links(&mut *tx, id, recipe.user_id, tags).await?;
        }

        if let Some(ref ingredients) = request.ingredients {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            replace_ingredient_links(&mut *tx, id, recipe.user_id, ingredients).await?;
        }

        tx.commit().await?;

        let tags = self.get_recipe_tags(id).await?;
        let ingredients = self.get_recipe_ingredients(id).await?;

        Ok(recipe.into_response(tags, ingredients))
    }
}

/// Insert link rows for the given tag ids, verifying every referenced tag
/// belongs to the recipe owner.
async fn replace_tag_links(tx: &mut PgConnection, recipe_id: RecipeId, user_id: UserId, tags: &[TagId]) -> Result<()> {
    if tags.is_empty() {
        return Ok(());
    }

    let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1) AND user_id = $2")
        .bind(tags)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if owned != tags.len() as i64 {
        return Err(DbError::ForeignKeyViolation {
            constraint: Some("recipe_tags_tag_id_fkey".to_string()),
            table: Some("recipe_tags".to_string()),
            message: "referenced tag does not exist for this user".to_string(),
        });
    }

    for tag_id in tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
    }

    Ok(())
}

/// Insert link rows for the given ingredient ids, verifying every referenced
/// ingredient belongs to the recipe owner.
async fn replace_ingredient_links(tx: &mut PgConnection, recipe_id: RecipeId, user_id: UserId, ingredients: &[IngredientId]) -> Result<()> {
    if ingredients.is_empty() {
        return Ok(());
    }

    let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE id = ANY($1) AND user_id = $2")
        .bind(ingredients)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if owned != ingredients.len() as i64 {
        return Err(DbError::ForeignKeyViolation {
            constraint: Some("recipe_ingredients_ingredient_id_fkey".to_string()),
            table: Some("recipe_ingredients".to_string()),
            message: "referenced ingredient does not exist for this user".to_string(),
        });
    }

    for ingredient_id in ingredients {
        sqlx::query("INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(recipe_id)
            .bind(ingredient_id)
            .execute(&mut *tx)
            .await?;
    }

    Ok(())
}

impl<'c> Recipes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Get a recipe only if it belongs to the given owner
    #[instrument(skip(self), fields(recipe_id = %abbrev_uuid(&id)), err)]
    pub async fn get_owned(&mut self, id: RecipeId, user_id: UserId) -> Result<Option<RecipeDBResponse>> {
        let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;

        match recipe {
            Some(recipe) => {
                let tags = self.get_recipe_tags(recipe.id).await?;
                let ingredients = self.get_recipe_ingredients(recipe.id).await?;
                Ok(Some(recipe.into_response(tags, ingredients)))
            }
            None => Ok(None),
        }
    }

    /// Store the image path for a recipe, replacing any previous value
    #[instrument(skip(self), fields(recipe_id = %abbrev_uuid(&id)), err)]
    pub async fn set_image(&mut self, id: RecipeId, image: &str) -> Result<()> {
        let result = sqlx::query("UPDATE recipes SET image = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() > 0 {
            Ok(())
        } else {
            Err(DbError::NotFound)
        }
    }

    #[instrument(skip(self), fields(recipe_id = %abbrev_uuid(&recipe_id)), err)]
    async fn get_recipe_tags(&mut self, recipe_id: RecipeId) -> Result<Vec<TagDBResponse>> {
        let mut map = self.get_recipes_tags_bulk(&[recipe_id]).await?;
        Ok(map.remove(&recipe_id).unwrap_or_default())
    }

    #[instrument(skip(self), fields(recipe_id = %abbrev_uuid(&recipe_id)), err)]
    async fn get_recipe_ingredients(&mut self, recipe_id: RecipeId) -> Result<Vec<IngredientDBResponse>> {
        let mut map = self.get_recipes_ingredients_bulk(&[recipe_id]).await?;
        Ok(map.remove(&recipe_id).unwrap_or_default())
    }

    #[instrument(skip(self, recipe_ids), fields(count = recipe_ids.len()), err)]
    async fn get_recipes_tags_bulk(&mut self, recipe_ids: &[RecipeId]) -> Result<HashMap<RecipeId, Vec<TagDBResponse>>> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LinkedTag>(
            r#"
            SELECT rt.recipe_id AS recipe_id, t.id AS id, t.user_id AS user_id, t.name AS name, t.created_at AS created_at
            FROM recipe_tags rt
            INNER JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<RecipeId, Vec<TagDBResponse>> = HashMap::new();
        for row in rows {
            result.entry(row.recipe_id).or_default().push(TagDBResponse {
                id: row.id,
                user_id: row.user_id,
                name: row.name,
                created_at: row.created_at,
            });
        }

        Ok(result)
    }

    #[instrument(skip(self, recipe_ids), fields(count = recipe_ids.len()), err)]
    async fn get_recipes_ingredients_bulk(&mut self, recipe_ids: &[RecipeId]) -> Result<HashMap<RecipeId, Vec<IngredientDBResponse>>> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LinkedIngredient>(
            r#"
            SELECT ri.recipe_id AS recipe_id, i.id AS id, i.user_id AS user_id, i.name AS name, i.created_at AS created_at
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY i.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<RecipeId, Vec<IngredientDBResponse>> = HashMap::new();
        for row in rows {
            result.entry(row.recipe_id).or_default().push(IngredientDBResponse {
                id: row.id,
                user_id: row.user_id,
                name: row.name,
                created_at: row.created_at,
            });
        }

        Ok(result)
    }
}
