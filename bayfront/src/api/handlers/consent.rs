//! Cookie-consent endpoints.
//!
//! The consent banner shows until a choice is persisted; the choice lives in a
//! long-lived cookie so it survives reloads and sessions. This tier never
//! interprets the choice beyond storing it - analytics gating happens in the
//! SPA.

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{Error, Result};

/// Cookie recording the visitor's consent choice.
pub const CONSENT_COOKIE: &str = "bf_cookie_consent";

/// One year, in seconds.
const CONSENT_MAX_AGE: u64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConsentChoice {
    Accepted,
    Declined,
}

impl ConsentChoice {
    fn as_str(self) -> &'static str {
        match self {
            ConsentChoice::Accepted => "accepted",
            ConsentChoice::Declined => "declined",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "accepted" => Some(ConsentChoice::Accepted),
            "declined" => Some(ConsentChoice::Declined),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsentState {
    /// `null` until the visitor has chosen; the SPA shows the banner while null
    pub choice: Option<ConsentChoice>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsentRequest {
    pub choice: ConsentChoice,
}

fn choice_from_cookies(request: &Request) -> Option<ConsentChoice> {
    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookies.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == CONSENT_COOKIE
        {
            return ConsentChoice::parse(value);
        }
    }
    None
}

#[utoipa::path(
    get,
    path = "/consent",
    tag = "consent",
    summary = "Read the persisted cookie-consent choice",
    responses((status = 200, body = ConsentState))
)]
pub async fn get_consent(request: Request) -> Json<ConsentState> {
    Json(ConsentState {
        choice: choice_from_cookies(&request),
    })
}

#[utoipa::path(
    put,
    path = "/consent",
    tag = "consent",
    summary = "Persist a cookie-consent choice",
    request_body = ConsentRequest,
    responses((status = 200, body = ConsentState))
)]
pub async fn put_consent(Json(request): Json<ConsentRequest>) -> Result<Response> {
    let cookie = format!(
        "{CONSENT_COOKIE}={}; Max-Age={CONSENT_MAX_AGE}; Path=/; SameSite=Lax",
        request.choice.as_str()
    );
    let value = HeaderValue::from_str(&cookie).map_err(|e| Error::Internal {
        operation: format!("encode consent cookie: {e}"),
    })?;

    let mut response = (
        StatusCode::OK,
        Json(ConsentState {
            choice: Some(request.choice),
        }),
    )
        .into_response();
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}
