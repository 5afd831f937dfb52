//! HTTP handlers for the embedded blog.

use axum::{extract::Path, Json};

use crate::{
    content::{self, Post, PostSummary},
    errors::{Error, Result},
};

#[utoipa::path(
    get,
    path = "/posts",
    tag = "blog",
    summary = "List blog posts",
    responses((status = 200, body = Vec<PostSummary>))
)]
pub async fn list_posts() -> Json<Vec<PostSummary>> {
    Json(content::list_posts())
}

#[utoipa::path(
    get,
    path = "/posts/{slug}",
    tag = "blog",
    summary = "Get one blog post as markdown",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, body = Post),
        (status = 404, description = "No such post"),
    )
)]
pub async fn get_post(Path(slug): Path<String>) -> Result<Json<Post>> {
    content::get_post(&slug).map(Json).ok_or_else(|| Error::NotFound {
        resource: "post".to_string(),
        id: slug,
    })
}
