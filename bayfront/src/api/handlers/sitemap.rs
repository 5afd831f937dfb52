//! Generated artifacts: sitemap and robots.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{content, errors::Result, sitemap, AppState};

// GET /sitemap.xml
#[tracing::instrument(skip_all)]
pub async fn sitemap_xml(State(state): State<AppState>) -> Result<Response> {
    let slugs = content::blog_slugs();
    let xml = sitemap::build(&state.config.site_url, &slugs, chrono::Utc::now().date_naive())?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml"), (header::CACHE_CONTROL, "public, max-age=3600")],
        xml,
    )
        .into_response())
}

// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> Response {
    let base = state.config.site_url.trim_end_matches('/');
    let body = format!("User-agent: *\nAllow: /\n\nSitemap: {base}/sitemap.xml\n");
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}
