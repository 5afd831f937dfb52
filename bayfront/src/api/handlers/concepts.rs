//! HTTP handlers for design concepts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::ideas::{ConceptCreate, ConceptResponse},
    api::models::pagination::Pagination,
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::ConceptId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/concepts",
    tag = "concepts",
    summary = "List design concepts, newest first",
    params(Pagination),
    responses((status = 200, body = Vec<ConceptResponse>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_concepts(State(state): State<AppState>, Query(pagination): Query<Pagination>) -> Result<Json<Vec<ConceptResponse>>> {
    let (skip, limit) = pagination.params();
    let records = state.catalog.list_concepts(skip, limit).await?;
    Ok(Json(records.into_iter().map(ConceptResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/concepts",
    tag = "concepts",
    summary = "Share a design concept",
    request_body = ConceptCreate,
    responses(
        (status = 201, body = ConceptResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_concept(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(create): Json<ConceptCreate>,
) -> Result<(StatusCode, Json<ConceptResponse>)> {
    if create.title.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "title must not be empty".to_string(),
        });
    }
    let record = state.catalog.create_concept(&user, create).await?;
    Ok((StatusCode::CREATED, Json(ConceptResponse::from(record))))
}

// DELETE /concepts/:id - owner or admin
#[tracing::instrument(skip_all)]
pub async fn delete_concept(State(state): State<AppState>, user: CurrentUser, Path(id): Path<ConceptId>) -> Result<StatusCode> {
    state.catalog.delete_concept(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
