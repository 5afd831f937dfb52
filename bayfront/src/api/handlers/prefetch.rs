//! Explicit prefetch intent from the SPA (hover or focus on a marketplace
//! link). Complements the history-driven warming in [`crate::prefetch`].

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    errors::{Error, Result},
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PrefetchRequest {
    /// What the visitor is about to open; currently only "marketplace"
    pub target: String,
}

// POST /prefetch - warm a query ahead of navigation
#[tracing::instrument(skip_all, fields(target = %request.target))]
pub async fn prefetch(State(state): State<AppState>, Json(request): Json<PrefetchRequest>) -> Result<StatusCode> {
    match request.target.as_str() {
        "marketplace" => {
            let catalog = state.catalog.clone();
            tokio::spawn(async move {
                if let Err(e) = catalog.prefetch_marketplace().await {
                    debug!("marketplace prefetch failed: {e}");
                }
            });
            Ok(StatusCode::ACCEPTED)
        }
        other => Err(Error::BadRequest {
            message: format!("unknown prefetch target: {other}"),
        }),
    }
}
