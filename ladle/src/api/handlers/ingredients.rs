use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::ingredients::{IngredientCreate, IngredientResponse, IngredientUpdate, ListIngredientsQuery},
    api::models::users::CurrentUser,
    db::{
        handlers::{labels::LabelFilter, Ingredients, Repository},
        models::ingredients::{IngredientCreateDBRequest, IngredientUpdateDBRequest},
    },
    errors::{Error, Result},
    types::IngredientId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/recipe/ingredients",
    tag = "ingredients",
    summary = "List ingredients",
    params(ListIngredientsQuery),
    responses(
        (status = 200, description = "The caller's ingredients, name descending", body = Vec<IngredientResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<IngredientResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Ingredients::new(&mut pool_conn);

    let filter = LabelFilter::new(current_user.id).assigned_only(query.assigned_only.unwrap_or(0) != 0);
    let ingredients = repo.list(&filter).await?;

    Ok(Json(ingredients.into_iter().map(IngredientResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/recipe/ingredients",
    tag = "ingredients",
    summary = "Create ingredient",
    request_body = IngredientCreate,
    responses(
        (status = 201, description = "Ingredient created successfully", body = IngredientResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<IngredientCreate>,
) -> Result<(StatusCode, Json<IngredientResponse>)> {
    if create.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Name may not be blank".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Ingredients::new(&mut pool_conn);

    let ingredient = repo
        .create(&IngredientCreateDBRequest {
            user_id: current_user.id,
            name: create.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(IngredientResponse::from(ingredient))))
}

#[utoipa::path(
    patch,
    path = "/recipe/ingredients/{ingredient_id}",
    tag = "ingredients",
    summary = "Update ingredient",
    request_body = IngredientUpdate,
    params(("ingredient_id" = uuid::Uuid, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient updated successfully", body = IngredientResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ingredient not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<IngredientId>,
    current_user: CurrentUser,
    Json(update): Json<IngredientUpdate>,
) -> Result<Json<IngredientResponse>> {
    if let Some(ref name) = update.name {
        if name.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Name may not be blank".to_string(),
            });
        }
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Ingredients::new(&mut pool_conn);

    // Rows owned by other users are indistinguishable from missing ones
    if repo.get_owned(ingredient_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Ingredient".to_string(),
            id: ingredient_id.to_string(),
        });
    }

    let ingredient = repo
        .update(ingredient_id, &IngredientUpdateDBRequest { name: update.name })
        .await?;

    Ok(Json(IngredientResponse::from(ingredient)))
}

#[utoipa::path(
    delete,
    path = "/recipe/ingredients/{ingredient_id}",
    tag = "ingredients",
    summary = "Delete ingredient",
    params(("ingredient_id" = uuid::Uuid, Path, description = "Ingredient ID")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ingredient not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<IngredientId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Ingredients::new(&mut pool_conn);

    if repo.get_owned(ingredient_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Ingredient".to_string(),
            id: ingredient_id.to_string(),
        });
    }

    repo.delete(ingredient_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
