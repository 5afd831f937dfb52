//! HTTP handlers for marketplace listings and the admin review queue.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::listings::{ListListingsQuery, ListingCreate, ListingResponse, ListingUpdate, ReviewQueueQuery},
    api::models::users::CurrentUser,
    auth::current_user::{MaybeUser, RequireAdmin},
    errors::{Error, Result},
    moderation::{ReviewAction, ReviewStatus},
    types::ListingId,
    AppState,
};

fn validate_create(create: &ListingCreate) -> Result<()> {
    if create.title.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "title must not be empty".to_string(),
        });
    }
    if create.description.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "description must not be empty".to_string(),
        });
    }
    if create.price_cents < 0 {
        return Err(Error::BadRequest {
            message: "price must not be negative".to_string(),
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/templates",
    tag = "templates",
    summary = "Browse marketplace templates",
    params(ListListingsQuery),
    responses(
        (status = 200, description = "Templates visible to the caller", body = Vec<ListingResponse>),
        (status = 401, description = "mine requested anonymously"),
        (status = 403, description = "include_all requested by a non-admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_templates(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ListListingsQuery>,
) -> Result<Json<Vec<ListingResponse>>> {
    let (skip, limit) = query.pagination.params();

    // Seller dashboard view: the caller's own listings, all workflow states
    if query.mine.unwrap_or(false) {
        let user = user.ok_or(Error::Unauthenticated { message: None })?;
        let records = state.catalog.list_my_listings(user.id, skip, limit).await?;
        return Ok(Json(records.into_iter().map(ListingResponse::from).collect()));
    }

    let include_all = query.include_all.unwrap_or(false);
    if include_all && !user.as_ref().is_some_and(CurrentUser::is_admin) {
        return Err(Error::Forbidden {
            action: "list".to_string(),
            resource: "unreviewed listings".to_string(),
        });
    }

    let records = state.catalog.list_listings(include_all, query.category, skip, limit).await?;
    Ok(Json(records.into_iter().map(ListingResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/templates/{id}",
    tag = "templates",
    summary = "Get one template",
    params(("id" = uuid::Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "The template", body = ListingResponse),
        (status = 404, description = "No such template"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_template(State(state): State<AppState>, Path(id): Path<ListingId>) -> Result<Json<ListingResponse>> {
    let record = state.catalog.get_listing(id).await?;
    // Detail views count; failures here must never fail the page
    state.catalog.record_view(id);
    Ok(Json(ListingResponse::from(record)))
}

#[utoipa::path(
    post,
    path = "/templates",
    tag = "templates",
    summary = "Submit a template",
    request_body = ListingCreate,
    responses(
        (status = 201, description = "Created; pending review unless submitted by an admin", body = ListingResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(create): Json<ListingCreate>,
) -> Result<(StatusCode, Json<ListingResponse>)> {
    validate_create(&create)?;
    let record = state.catalog.create_listing(&user, create).await?;
    Ok((StatusCode::CREATED, Json(ListingResponse::from(record))))
}

#[utoipa::path(
    patch,
    path = "/templates/{id}",
    tag = "templates",
    summary = "Edit a template",
    params(("id" = uuid::Uuid, Path, description = "Listing ID")),
    request_body = ListingUpdate,
    responses(
        (status = 200, description = "Updated template", body = ListingResponse),
        (status = 403, description = "Caller is neither the owner nor an admin"),
        (status = 404, description = "No such template"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_template(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ListingId>,
    Json(update): Json<ListingUpdate>,
) -> Result<Json<ListingResponse>> {
    let record = state.catalog.update_listing(&user, id, update).await?;
    Ok(Json(ListingResponse::from(record)))
}

#[utoipa::path(
    delete,
    path = "/templates/{id}",
    tag = "templates",
    summary = "Delete a template",
    params(("id" = uuid::Uuid, Path, description = "Listing ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Caller is neither the owner nor an admin"),
        (status = 404, description = "No such template"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_template(State(state): State<AppState>, user: CurrentUser, Path(id): Path<ListingId>) -> Result<StatusCode> {
    state.catalog.delete_listing(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /templates/:id/downloads - count a download
#[tracing::instrument(skip_all)]
pub async fn record_download(State(state): State<AppState>, Path(id): Path<ListingId>) -> Result<StatusCode> {
    state.catalog.record_download(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/review/queue",
    tag = "review",
    summary = "List listings awaiting review action",
    params(ReviewQueueQuery),
    responses(
        (status = 200, description = "Listings in the requested workflow state", body = Vec<ListingResponse>),
        (status = 403, description = "Admin only"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn review_queue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ReviewQueueQuery>,
) -> Result<Json<Vec<ListingResponse>>> {
    let status = query.status.unwrap_or(ReviewStatus::Pending);
    let (skip, limit) = query.pagination.params();
    let records = state.catalog.review_queue(status, skip, limit).await?;
    Ok(Json(records.into_iter().map(ListingResponse::from).collect()))
}

async fn apply_action(state: AppState, id: ListingId, action: ReviewAction) -> Result<Json<ListingResponse>> {
    let record = state.catalog.transition_listing(id, action).await?;
    Ok(Json(ListingResponse::from(record)))
}

// POST /templates/:id/approve - pending -> approved
#[tracing::instrument(skip_all)]
pub async fn approve_template(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>> {
    apply_action(state, id, ReviewAction::Approve).await
}

// POST /templates/:id/reject - pending -> rejected
#[tracing::instrument(skip_all)]
pub async fn reject_template(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>> {
    apply_action(state, id, ReviewAction::Reject).await
}

// POST /templates/:id/feature - approved -> featured
#[tracing::instrument(skip_all)]
pub async fn feature_template(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>> {
    apply_action(state, id, ReviewAction::Feature).await
}

// POST /templates/:id/unfeature - featured -> approved
#[tracing::instrument(skip_all)]
pub async fn unfeature_template(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>> {
    apply_action(state, id, ReviewAction::Unfeature).await
}

// POST /templates/:id/archive - any -> archived
#[tracing::instrument(skip_all)]
pub async fn archive_template(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>> {
    apply_action(state, id, ReviewAction::Archive).await
}
