//! Checkout provider abstraction layer.
//!
//! Purchases are not settled in this tier: the hosted backend exposes a
//! serverless checkout function that talks to the payment processor and hands
//! back a redirect URL. This module defines the `CheckoutProvider` trait over
//! that interaction, with a dummy implementation for development and tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::config::{BackendConfig, CheckoutConfig};
use crate::store::models::ListingRecord;

/// Result type for checkout provider operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors that can occur while starting a checkout
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("listing is not purchasable: {reason}")]
    ListingNotPurchasable { reason: String },

    #[error("unsupported currency: {currency}")]
    InvalidCurrency { currency: String },

    /// The checkout function answered without `checkoutUrl` or `url`
    #[error("checkout response carried no redirect URL")]
    MissingRedirectUrl,

    #[error("checkout provider API error: {0}")]
    ProviderApi(String),

    #[error("checkout provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Create a checkout provider from configuration
///
/// This is the single point where config becomes a provider instance. Adding a
/// new provider requires adding a match arm here.
pub fn create_provider(checkout: &CheckoutConfig, backend: &BackendConfig) -> Result<Box<dyn CheckoutProvider>> {
    match checkout {
        CheckoutConfig::HostedFunction { function_url, .. } => Ok(Box::new(HostedFunctionProvider::new(
            function_url.clone(),
            backend.service_key.clone(),
        )?)),
        CheckoutConfig::Dummy { .. } => Ok(Box::new(DummyProvider)),
    }
}

/// Normalize and validate a client-supplied currency, falling back to the
/// configured default when the client named none.
pub fn normalize_currency(requested: Option<&str>, default: &str) -> Result<String> {
    let raw = requested.unwrap_or(default).trim().to_ascii_lowercase();
    if raw.len() == 3 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(raw)
    } else {
        Err(CheckoutError::InvalidCurrency { currency: raw })
    }
}

/// Abstract checkout interface: turn a listing into a redirect URL the buyer
/// is sent to.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout(&self, listing: &ListingRecord, currency: &str) -> Result<String>;
}

/// Provider backed by the hosted serverless checkout function.
pub struct HostedFunctionProvider {
    http: reqwest::Client,
    function_url: Url,
}

impl HostedFunctionProvider {
    pub fn new(function_url: Url, service_key: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(bearer) = reqwest::header::HeaderValue::from_str(&format!("Bearer {service_key}")) {
            headers.insert(reqwest::header::AUTHORIZATION, bearer);
        }
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, function_url })
    }
}

#[async_trait]
impl CheckoutProvider for HostedFunctionProvider {
    async fn create_checkout(&self, listing: &ListingRecord, currency: &str) -> Result<String> {
        let response = self
            .http
            .post(self.function_url.clone())
            .json(&json!({ "productId": listing.id, "currency": currency }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::ProviderApi(format!("checkout function returned {status}: {body}")));
        }

        let body: Value = response.json().await?;
        // The function has answered with either field across deployments
        let redirect = body
            .get("checkoutUrl")
            .or_else(|| body.get("url"))
            .and_then(Value::as_str)
            .ok_or(CheckoutError::MissingRedirectUrl)?;

        info!(listing_id = %listing.id, "checkout session created");
        Ok(redirect.to_string())
    }
}

/// Dummy provider that fabricates a redirect URL without charging anyone.
/// Useful for development and tests.
pub struct DummyProvider;

#[async_trait]
impl CheckoutProvider for DummyProvider {
    async fn create_checkout(&self, listing: &ListingRecord, currency: &str) -> Result<String> {
        let session_id = format!("dummy_session_{}_{}", listing.id, Uuid::new_v4());
        info!(listing_id = %listing.id, %session_id, "dummy checkout session created");
        Ok(format!("https://checkout.bayfront.test/session/{session_id}?currency={currency}"))
    }
}
