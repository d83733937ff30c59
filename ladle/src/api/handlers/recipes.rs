use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::models::recipes::{ListRecipesQuery, RecipeCreate, RecipeDetailResponse, RecipeImageResponse, RecipeResponse, RecipeUpdate},
    api::models::users::CurrentUser,
    db::{
        handlers::{recipes::RecipeFilter, Recipes, Repository},
        models::recipes::{RecipeCreateDBRequest, RecipeUpdateDBRequest},
    },
    errors::{Error, Result},
    storage,
    types::RecipeId,
    AppState,
};

/// Parse a comma-separated list of uuids from a query parameter
fn parse_id_list(raw: &str) -> Result<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| Error::BadRequest {
                message: format!("Invalid id in filter: {s}"),
            })
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/recipe/recipes",
    tag = "recipes",
    summary = "List recipes",
    params(ListRecipesQuery),
    responses(
        (status = 200, description = "The caller's recipes, newest first", body = Vec<RecipeResponse>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<ListRecipesQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<RecipeResponse>>> {
    let mut filter = RecipeFilter::new(current_user.id);
    if let Some(ref tags) = query.tags {
        filter = filter.with_tags(parse_id_list(tags)?);
    }
    if let Some(ref ingredients) = query.ingredients {
        filter = filter.with_ingredients(parse_id_list(ingredients)?);
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Recipes::new(&mut pool_conn);

    let recipes = repo.list(&filter).await?;

    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/recipe/recipes",
    tag = "recipes",
    summary = "Create recipe",
    request_body = RecipeCreate,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<RecipeCreate>,
) -> Result<(StatusCode, Json<RecipeResponse>)> {
    if create.title.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Title may not be blank".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Recipes::new(&mut pool_conn);

    let recipe = repo
        .create(&RecipeCreateDBRequest {
            user_id: current_user.id,
            title: create.title,
            time_minutes: create.time_minutes,
            price: create.price,
            link: create.link,
            tags: create.tags,
            ingredients: create.ingredients,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}

#[utoipa::path(
    get,
    path = "/recipe/recipes/{recipe_id}",
    tag = "recipes",
    summary = "Get recipe",
    params(("recipe_id" = uuid::Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<RecipeId>,
    current_user: CurrentUser,
) -> Result<Json<RecipeDetailResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Recipes::new(&mut pool_conn);

    // Rows owned by other users are indistinguishable from missing ones
    match repo.get_owned(recipe_id, current_user.id).await? {
        Some(recipe) => Ok(Json(RecipeDetailResponse::from(recipe))),
        None => Err(Error::NotFound {
            resource: "Recipe".to_string(),
            id: recipe_id.to_string(),
        }),
    }
}

#[utoipa::path(
    patch,
    path = "/recipe/recipes/{recipe_id}",
    tag = "recipes",
    summary = "Update recipe",
    request_body = RecipeUpdate,
    params(("recipe_id" = uuid::Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeDetailResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<RecipeId>,
    current_user: CurrentUser,
    Json(update): Json<RecipeUpdate>,
) -> Result<Json<RecipeDetailResponse>> {
    if let Some(ref title) = update.title {
        if title.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Title may not be blank".to_string(),
            });
        }
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Recipes::new(&mut pool_conn);

    if repo.get_owned(recipe_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Recipe".to_string(),
            id: recipe_id.to_string(),
        });
    }

    let recipe = repo
        .update(
            recipe_id,
            &RecipeUpdateDBRequest {
                title: update.title,
                time_minutes: update.time_minutes,
                price: update.price,
                link: update.link,
                tags: update.tags,
                ingredients: update.ingredients,
            },
        )
        .await?;

    Ok(Json(RecipeDetailResponse::from(recipe)))
}

#[utoipa::path(
    delete,
    path = "/recipe/recipes/{recipe_id}",
    tag = "recipes",
    summary = "Delete recipe",
    params(("recipe_id" = uuid::Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_recipe(State(state): State<AppState>, Path(recipe_id): Path<RecipeId>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Recipes::new(&mut pool_conn);

    if repo.get_owned(recipe_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Recipe".to_string(),
            id: recipe_id.to_string(),
        });
    }

    repo.delete(recipe_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/recipe/recipes/{recipe_id}/image",
    tag = "recipes",
    summary = "Upload recipe image",
    params(("recipe_id" = uuid::Uuid, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Invalid upload"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upload_recipe_image(
    State(state): State<AppState>,
    Path(recipe_id): Path<RecipeId>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<RecipeImageResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Recipes::new(&mut pool_conn);

    if repo.get_owned(recipe_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Recipe".to_string(),
            id: recipe_id.to_string(),
        });
    }

    // Pull the "image" part out of the multipart body
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Invalid multipart body: {e}"),
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read image field: {e}"),
        })?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| Error::BadRequest {
        message: "Multipart field 'image' is required".to_string(),
    })?;

    if data.is_empty() {
        return Err(Error::BadRequest {
            message: "Uploaded image is empty".to_string(),
        });
    }

    let image_path = storage::save_recipe_image(&state.config.media_root, &filename, &data).await?;
    repo.set_image(recipe_id, &image_path).await?;

    Ok(Json(RecipeImageResponse {
        id: recipe_id,
        image: image_path,
    }))
}
