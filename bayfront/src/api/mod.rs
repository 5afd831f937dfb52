//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Templates** (`/api/v1/templates/*`): marketplace browsing, submission,
//!   owner edits, download counting, review quick actions
//! - **Review** (`/api/v1/review/queue`): admin review queue
//! - **Ideas & Concepts** (`/api/v1/ideas/*`, `/api/v1/concepts/*`): community
//!   submissions
//! - **Profiles** (`/api/v1/profiles/*`): seller profiles
//! - **Checkout** (`/api/v1/checkout`): purchase initiation
//! - **Assistant** (`/api/v1/assistant/chat`): shopping assistant relay
//! - **Blog** (`/api/v1/posts/*`): embedded marketing content
//! - **Consent** (`/api/v1/consent`): cookie-consent persistence
//!
//! # OpenAPI Documentation
//!
//! Endpoints are documented with `utoipa` annotations and aggregated into a
//! document served at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;
