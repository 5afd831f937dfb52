//! HTTP handlers for seller profiles.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::models::profiles::{ProfileResponse, ProfileUpdate},
    api::models::users::CurrentUser,
    errors::Result,
    types::UserId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/profiles/me",
    tag = "profiles",
    summary = "Get the caller's profile",
    responses(
        (status = 200, body = ProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No profile row yet"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_my_profile(State(state): State<AppState>, user: CurrentUser) -> Result<Json<ProfileResponse>> {
    let record = state.catalog.get_profile(user.id).await?;
    Ok(Json(ProfileResponse::from(record)))
}

#[utoipa::path(
    patch,
    path = "/profiles/me",
    tag = "profiles",
    summary = "Update the caller's profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, body = ProfileResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_my_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>> {
    let record = state.catalog.update_profile(&user, update).await?;
    Ok(Json(ProfileResponse::from(record)))
}

// GET /profiles/:id - public seller page
#[tracing::instrument(skip_all)]
pub async fn get_profile(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<ProfileResponse>> {
    let record = state.catalog.get_profile(id).await?;
    Ok(Json(ProfileResponse::from(record)))
}
