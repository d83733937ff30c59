use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::tags::{ListTagsQuery, TagCreate, TagResponse, TagUpdate},
    api::models::users::CurrentUser,
    db::{
        handlers::{labels::LabelFilter, Repository, Tags},
        models::tags::{TagCreateDBRequest, TagUpdateDBRequest},
    },
    errors::{Error, Result},
    types::TagId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/recipe/tags",
    tag = "tags",
    summary = "List tags",
    params(ListTagsQuery),
    responses(
        (status = 200, description = "The caller's tags, name descending", body = Vec<TagResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<ListTagsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<TagResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tags::new(&mut pool_conn);

    let filter = LabelFilter::new(current_user.id).assigned_only(query.assigned_only.unwrap_or(0) != 0);
    let tags = repo.list(&filter).await?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/recipe/tags",
    tag = "tags",
    summary = "Create tag",
    request_body = TagCreate,
    responses(
        (status = 201, description = "Tag created successfully", body = TagResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_tag(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<TagCreate>,
) -> Result<(StatusCode, Json<TagResponse>)> {
    if create.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Name may not be blank".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tags::new(&mut pool_conn);

    let tag = repo
        .create(&TagCreateDBRequest {
            user_id: current_user.id,
            name: create.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

#[utoipa::path(
    patch,
    path = "/recipe/tags/{tag_id}",
    tag = "tags",
    summary = "Update tag",
    request_body = TagUpdate,
    params(("tag_id" = uuid::Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag updated successfully", body = TagResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tag not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<TagId>,
    current_user: CurrentUser,
    Json(update): Json<TagUpdate>,
) -> Result<Json<TagResponse>> {
    if let Some(ref name) = update.name {
        if name.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Name may not be blank".to_string(),
            });
        }
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tags::new(&mut pool_conn);

    // Rows owned by other users are indistinguishable from missing ones
    if repo.get_owned(tag_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Tag".to_string(),
            id: tag_id.to_string(),
        });
    }

    let tag = repo.update(tag_id, &TagUpdateDBRequest { name: update.name }).await?;

    Ok(Json(TagResponse::from(tag)))
}

#[utoipa::path(
    delete,
    path = "/recipe/tags/{tag_id}",
    tag = "tags",
    summary = "Delete tag",
    params(("tag_id" = uuid::Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tag not found"),
    ),
    security(("BearerAuth" = []), ("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_tag(State(state): State<AppState>, Path(tag_id): Path<TagId>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tags::new(&mut pool_conn);

    if repo.get_owned(tag_id, current_user.id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Tag".to_string(),
            id: tag_id.to_string(),
        });
    }

    repo.delete(tag_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
