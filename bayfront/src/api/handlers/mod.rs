//! Axum route handlers for the storefront API.

pub mod assistant;
pub mod checkout;
pub mod concepts;
pub mod config;
pub mod consent;
pub mod ideas;
pub mod listings;
pub mod posts;
pub mod prefetch;
pub mod profiles;
pub mod sitemap;
pub mod static_assets;
