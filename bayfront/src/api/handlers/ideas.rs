//! HTTP handlers for template ideas.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::ideas::{IdeaCreate, IdeaResponse},
    api::models::pagination::Pagination,
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::IdeaId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/ideas",
    tag = "ideas",
    summary = "List template ideas, newest first",
    params(Pagination),
    responses((status = 200, body = Vec<IdeaResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_ideas(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<Vec<IdeaResponse>>> {
    let (skip, limit) = pagination.params();
    let records = state.catalog.list_ideas(skip, limit).await?;
    Ok(Json(records.into_iter().map(IdeaResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/ideas",
    tag = "ideas",
    summary = "Share a template idea",
    request_body = IdeaCreate,
    responses(
        (status = 201, body = IdeaResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_idea(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(create): Json<IdeaCreate>,
) -> Result<(StatusCode, Json<IdeaResponse>)> {
    if create.title.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "title must not be empty".to_string(),
        });
    }
    let record = state.catalog.create_idea(&user, create).await?;
    Ok((StatusCode::CREATED, Json(IdeaResponse::from(record))))
}

// DELETE /ideas/:id - owner or admin
#[tracing::instrument(skip_all)]
pub async fn delete_idea(State(state): State<AppState>, user: CurrentUser, Path(id): Path<IdeaId>) -> Result<StatusCode> {
    state.catalog.delete_idea(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
