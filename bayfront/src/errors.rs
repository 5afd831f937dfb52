use crate::checkout::CheckoutError;
use crate::moderation::ReviewStatus;
use crate::store::errors::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// User lacks the role required for the operation
    #[error("Insufficient permissions to {action} {resource}")]
    Forbidden { action: String, resource: String },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Review-workflow transition not allowed by the transition table
    #[error("Cannot move listing from {from} to {to}")]
    InvalidTransition { from: ReviewStatus, to: ReviewStatus },

    /// Chat assistant is switched off in configuration
    #[error("Assistant is not enabled")]
    AssistantUnavailable,

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Remote data store operation error. Arc'd because cached fetches share
    /// one failure between every attached caller.
    #[error(transparent)]
    Store(#[from] std::sync::Arc<StoreError>),

    /// Checkout provider error
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::InvalidTransition { .. } => StatusCode::CONFLICT,
            Error::AssistantUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(store_err) => match store_err.as_ref() {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Remote { .. } | StoreError::Transport(_) => StatusCode::BAD_GATEWAY,
                StoreError::Decode { .. } | StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Checkout(checkout_err) => match checkout_err {
                CheckoutError::ListingNotPurchasable { .. } => StatusCode::CONFLICT,
                CheckoutError::InvalidCurrency { .. } => StatusCode::BAD_REQUEST,
                CheckoutError::MissingRedirectUrl | CheckoutError::ProviderApi(_) | CheckoutError::Transport(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::Forbidden { action, resource } => {
                format!("Insufficient permissions to {action} {resource}")
            }
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::InvalidTransition { from, to } => {
                format!("A {from} listing cannot be moved to {to}")
            }
            Error::AssistantUnavailable => "The chat assistant is not available on this storefront".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Store(store_err) => match store_err.as_ref() {
                StoreError::NotFound => "Resource not found".to_string(),
                StoreError::Remote { .. } | StoreError::Transport(_) => {
                    "The marketplace data service is currently unavailable".to_string()
                }
                StoreError::Decode { .. } | StoreError::Other(_) => "Internal server error".to_string(),
            },
            Error::Checkout(checkout_err) => match checkout_err {
                CheckoutError::ListingNotPurchasable { reason } => {
                    format!("This template cannot be purchased: {reason}")
                }
                CheckoutError::InvalidCurrency { currency } => format!("Unsupported currency: {currency}"),
                CheckoutError::MissingRedirectUrl | CheckoutError::ProviderApi(_) | CheckoutError::Transport(_) => {
                    "Checkout is currently unavailable, please try again".to_string()
                }
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Store(store_err) => match store_err.as_ref() {
                StoreError::Decode { .. } | StoreError::Other(_) => {
                    tracing::error!("Internal service error: {:#}", self);
                }
                _ => {
                    tracing::warn!("Upstream service error: {}", self);
                }
            },
            Error::Checkout(_) => {
                tracing::warn!("Upstream service error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::InvalidTransition { .. } | Error::AssistantUnavailable => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();

        // Transition conflicts get a structured body so the review UI can show which move failed
        match &self {
            Error::InvalidTransition { from, to } => {
                use serde_json::json;
                let body = json!({
                    "message": self.user_message(),
                    "from": from,
                    "to": to,
                });
                (status, axum::response::Json(body)).into_response()
            }
            _ => {
                let user_message = self.user_message();
                (status, user_message).into_response()
            }
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(std::sync::Arc::new(err))
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
