//! Navigation-driven cache warming.
//!
//! The storefront keeps a short per-session memory of page routes (the last
//! three, most recent first) and uses it to warm the marketplace listing query
//! before the visitor lands there: returning visitors who had the marketplace
//! in their recent history get their listings fetched while the SPA shell is
//! still loading. The SPA can also signal intent explicitly (hover/focus on a
//! marketplace link) via `POST /api/v1/prefetch`.
//!
//! Everything in this module is best-effort. History writes that fail are
//! logged and swallowed, and a failed warm-up fetch costs nothing: the key
//! stays eligible for the regular read path.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::AppState;

/// Maximum number of routes remembered per session.
pub const HISTORY_LIMIT: usize = 3;

/// Cookie naming the visitor's session for route-history purposes. Opaque
/// UUID, no auth semantics.
pub const SESSION_COOKIE: &str = "bf_session";

#[derive(Debug, Error)]
#[error("session store unavailable: {reason}")]
pub struct SessionStoreError {
    pub reason: String,
}

/// Session-scoped storage for the recent-route list. The trait exists so
/// tests can inject a failing store; production uses the in-memory map.
pub trait SessionStore: Send + Sync {
    fn load(&self, session: &str) -> Result<Vec<String>, SessionStoreError>;
    fn save(&self, session: &str, routes: &[String]) -> Result<(), SessionStoreError>;
}

/// In-memory session store. Per-tab history in the original storefront was
/// session storage; per-process is the equivalent lifetime here.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Vec<String>>,
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, session: &str) -> Result<Vec<String>, SessionStoreError> {
        Ok(self.sessions.get(session).map(|r| r.clone()).unwrap_or_default())
    }

    fn save(&self, session: &str, routes: &[String]) -> Result<(), SessionStoreError> {
        self.sessions.insert(session.to_string(), routes.to_vec());
        Ok(())
    }
}

/// Bounded recent-route history over a [`SessionStore`].
#[derive(Clone)]
pub struct RouteHistory {
    store: Arc<dyn SessionStore>,
}

impl RouteHistory {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySessionStore::default()))
    }

    /// Record a page visit and return the updated history, most recent first.
    /// Re-visiting a route moves it to the front rather than duplicating it.
    /// Storage failures are swallowed; the computed history is still returned
    /// so the caller can act on it.
    pub fn record(&self, session: &str, route: &str) -> Vec<String> {
        let mut routes = match self.store.load(session) {
            Ok(routes) => routes,
            Err(e) => {
                debug!("route history load failed, starting fresh: {e}");
                Vec::new()
            }
        };

        routes.retain(|r| r != route);
        routes.insert(0, route.to_string());
        routes.truncate(HISTORY_LIMIT);

        if let Err(e) = self.store.save(session, &routes) {
            debug!("route history save failed, visit not recorded: {e}");
        }
        routes
    }

    /// The recorded history for a session, most recent first.
    pub fn recent(&self, session: &str) -> Vec<String> {
        self.store.load(session).unwrap_or_else(|e| {
            debug!("route history load failed: {e}");
            Vec::new()
        })
    }
}

/// Whether a request path is a page navigation worth remembering. API calls,
/// generated artifacts and asset files are not.
fn is_page_route(path: &str) -> bool {
    if path.starts_with("/api/") || path.starts_with("/internal/") || path.starts_with("/api-docs") {
        return false;
    }
    if matches!(path, "/healthz" | "/sitemap.xml" | "/robots.txt" | "/docs") {
        return false;
    }
    // Asset requests carry a file extension in the last segment
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    !last_segment.contains('.')
}

fn session_from_cookies(request: &Request) -> Option<String> {
    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookies.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == SESSION_COOKIE
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Middleware: track page navigations per session and warm the marketplace
/// listing query when the visitor's history says they are heading there.
/// Mints the session cookie on first visit.
pub async fn track_routes(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let is_visit = request.method() == Method::GET && is_page_route(request.uri().path());
    if !is_visit {
        return next.run(request).await;
    }

    let route = request.uri().path().to_string();
    let (session, minted) = match session_from_cookies(&request) {
        Some(session) => (session, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let history = state.route_history.record(&session, &route);
    let marketplace_routes = &state.config.prefetch.marketplace_routes;
    if history.iter().any(|r| marketplace_routes.contains(r)) {
        trace!(%route, "recent history includes the marketplace, warming listings");
        let catalog = state.catalog.clone();
        tokio::spawn(async move {
            if let Err(e) = catalog.prefetch_marketplace().await {
                debug!("marketplace prefetch failed: {e}");
            }
        });
    }

    let mut response = next.run(request).await;
    if minted {
        let cookie = format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
