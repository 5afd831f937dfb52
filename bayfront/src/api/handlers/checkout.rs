//! HTTP handler for starting a purchase.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::models::users::CurrentUser,
    checkout::{normalize_currency, CheckoutError},
    errors::Result,
    types::ListingId,
    AppState,
};

/// Checkout request from the SPA. The camelCase aliases match the payload the
/// hosted checkout function itself speaks, so the widget can send either.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(alias = "productId")]
    pub product_id: ListingId,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Where to send the buyer
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "checkout",
    summary = "Start a checkout session for a template",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Redirect URL for the hosted payment page", body = CheckoutResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such template"),
        (status = 409, description = "Template is not purchasable in its current state"),
        (status = 502, description = "Checkout function failed"),
    )
)]
#[tracing::instrument(skip_all, fields(listing_id = %request.product_id))]
pub async fn create_checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let listing = state.catalog.get_listing(request.product_id).await?;
    if !listing.status.is_purchasable() {
        return Err(CheckoutError::ListingNotPurchasable {
            reason: format!("listing is {}", listing.status),
        }
        .into());
    }

    let currency = normalize_currency(request.currency.as_deref(), state.config.checkout.default_currency())?;
    let url = state.checkout.create_checkout(&listing, &currency).await?;

    tracing::info!(buyer = %user.id, listing = %listing.id, "checkout started");
    Ok(Json(CheckoutResponse { url }))
}
