//! Authentication and authorization.
//!
//! Bayfront does not issue credentials. The hosted auth service signs HS256
//! access tokens; this tier verifies them with the shared secret and turns the
//! claims into a [`crate::api::models::users::CurrentUser`]. Two transports
//! are accepted, in priority order:
//!
//! 1. `Authorization: Bearer <token>` (the SPA's API calls)
//! 2. the access-token cookie named by `auth.access_token_cookie` (full page
//!    loads)
//!
//! Authorization is role-based and deliberately small: tokens carry either the
//! `administrator` or the `standard` role, and admin-only routes use the
//! [`current_user::RequireAdmin`] extractor.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use bayfront::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.email)
//! }
//!
//! async fn admin_handler(RequireAdmin(user): RequireAdmin) -> String {
//!     format!("Welcome to the review queue, {}", user.email)
//! }
//! ```

pub mod current_user;
pub mod session;
