//! Axum extractors for the authenticated user.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use tracing::trace;

use crate::{
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    AppState,
};

/// Pull the access token out of the request, preferring the Authorization
/// header over the cookie.
fn extract_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION)
        && let Ok(value) = value.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    let cookie_header = parts.headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name == cookie_name
        {
            return Some(value.to_string());
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = extract_token(parts, &state.config.auth.access_token_cookie)
            .ok_or(Error::Unauthenticated { message: None })?;
        session::verify_access_token(&token, &state.config)
    }
}

/// Optional authentication: `None` for anonymous visitors, and also for
/// requests carrying an invalid or expired token (public pages must keep
/// rendering when a stale cookie is around).
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let user = match extract_token(parts, &state.config.auth.access_token_cookie) {
            Some(token) => match session::verify_access_token(&token, &state.config) {
                Ok(user) => Some(user),
                Err(e) => {
                    trace!("ignoring invalid access token on optional-auth route: {e}");
                    None
                }
            },
            None => None,
        };
        Ok(MaybeUser(user))
    }
}

/// Admin gate: extracts the current user and rejects non-administrators.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(Error::Forbidden {
                action: "administer".to_string(),
                resource: "listings".to_string(),
            });
        }
        Ok(RequireAdmin(user))
    }
}
