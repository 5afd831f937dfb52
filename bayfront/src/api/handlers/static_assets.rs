//! HTTP handlers for static asset serving.

use axum::{
    body::Body,
    http::{Response, StatusCode, Uri},
};
use tracing::instrument;

use crate::static_assets;

/// Serve embedded static assets with SPA fallback: unknown paths get
/// `index.html` so client-side routing works on deep links.
#[instrument]
pub async fn serve_embedded_asset(uri: Uri) -> Response<Body> {
    let mut path = uri.path().trim_start_matches('/');

    // If path is empty or ends with /, serve index.html
    if path.is_empty() || path.ends_with('/') {
        path = "index.html";
    }

    if let Some(content) = static_assets::Assets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        // Hashed bundle files can be cached indefinitely; everything else must
        // revalidate so deploys take effect
        let cache_control = if path.starts_with("assets/") {
            "public, max-age=31536000, immutable"
        } else {
            "no-cache"
        };

        return Response::builder()
            .header(axum::http::header::CONTENT_TYPE, mime.as_ref())
            .header(axum::http::header::CACHE_CONTROL, cache_control)
            .body(Body::from(content.data.into_owned()))
            .expect("static response");
    }

    // If not found, serve index.html for SPA client-side routing
    if let Some(index) = static_assets::Assets::get("index.html") {
        return Response::builder()
            .header(axum::http::header::CONTENT_TYPE, "text/html")
            .header(axum::http::header::CACHE_CONTROL, "no-cache")
            .body(Body::from(index.data.into_owned()))
            .expect("static response");
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::empty())
        .expect("static response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum_test::TestServer;

    fn create_test_router() -> Router {
        Router::new().fallback(serve_embedded_asset)
    }

    #[tokio::test]
    async fn test_serve_root_returns_index_html() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/html")
        );
        assert!(response.text().contains("<!doctype html>"));
    }

    #[tokio::test]
    async fn test_spa_fallback_for_client_routes() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/marketplace").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("text/html")
        );
        assert_eq!(
            response.headers().get("cache-control").map(|v| v.to_str().unwrap()),
            Some("no-cache")
        );
    }

    #[tokio::test]
    async fn test_serve_favicon_with_mime() {
        let server = TestServer::new(create_test_router()).unwrap();

        let response = server.get("/favicon.svg").await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("image/svg+xml")
        );
    }
}
