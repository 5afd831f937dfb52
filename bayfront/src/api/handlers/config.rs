//! Public runtime configuration for the SPA.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

/// The subset of configuration the SPA needs before it can render. Nothing
/// secret belongs here; this endpoint is unauthenticated.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicConfig {
    pub site_name: String,
    pub tagline: String,
    pub currency: String,
    pub assistant_enabled: bool,
}

#[utoipa::path(
    get,
    path = "/config",
    tag = "config",
    summary = "Public storefront configuration",
    responses((status = 200, body = PublicConfig))
)]
pub async fn get_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(PublicConfig {
        site_name: state.config.metadata.site_name.clone(),
        tagline: state.config.metadata.tagline.clone(),
        currency: state.config.checkout.default_currency().to_string(),
        assistant_enabled: state.assistant.enabled(),
    })
}
