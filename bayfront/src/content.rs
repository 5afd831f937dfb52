//! Embedded blog content.
//!
//! Blog posts are markdown files compiled into the binary; the slug is the
//! file stem and the title is the first `#` heading. The SPA renders the
//! markdown; this tier only enumerates and serves it (and feeds the slugs to
//! the sitemap).

use rust_embed::RustEmbed;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(RustEmbed)]
#[folder = "content/blog/"]
struct BlogContent;

/// A blog post listing entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
}

/// A full blog post.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Post {
    pub slug: String,
    pub title: String,
    /// Raw markdown body, heading included
    pub body: String,
}

/// All blog slugs, sorted for stable sitemap output.
pub fn blog_slugs() -> Vec<String> {
    let mut slugs: Vec<String> = BlogContent::iter()
        .filter_map(|file| file.strip_suffix(".md").map(str::to_string))
        .collect();
    slugs.sort();
    slugs
}

/// Listing of every post, sorted by slug.
pub fn list_posts() -> Vec<PostSummary> {
    blog_slugs()
        .into_iter()
        .filter_map(|slug| {
            let post = get_post(&slug)?;
            Some(PostSummary {
                slug: post.slug,
                title: post.title,
            })
        })
        .collect()
}

/// Load one post by slug.
pub fn get_post(slug: &str) -> Option<Post> {
    // Slugs are file stems; refuse anything that could traverse
    if slug.contains('/') || slug.contains("..") {
        return None;
    }
    let file = BlogContent::get(&format!("{slug}.md"))?;
    let body = String::from_utf8(file.data.into_owned()).ok()?;
    let title = title_from_markdown(&body).unwrap_or_else(|| slug.replace('-', " "));
    Some(Post {
        slug: slug.to_string(),
        title,
        body,
    })
}

/// First `#` heading of a markdown document.
fn title_from_markdown(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_are_sorted_file_stems() {
        let slugs = blog_slugs();
        assert!(!slugs.is_empty());
        let mut sorted = slugs.clone();
        sorted.sort();
        assert_eq!(slugs, sorted);
        assert!(slugs.contains(&"launch-checklist".to_string()));
        assert!(slugs.iter().all(|s| !s.ends_with(".md")));
    }

    #[test]
    fn test_posts_take_title_from_heading() {
        let post = get_post("launch-checklist").expect("embedded post");
        assert_eq!(post.title, "The ten-minute launch checklist");
        assert!(post.body.starts_with("# "));
    }

    #[test]
    fn test_unknown_and_traversal_slugs_are_rejected() {
        assert!(get_post("no-such-post").is_none());
        assert!(get_post("../Cargo").is_none());
        assert!(get_post("a/b").is_none());
    }

    #[test]
    fn test_listing_covers_every_slug() {
        assert_eq!(list_posts().len(), blog_slugs().len());
    }

    #[test]
    fn test_heading_extraction() {
        assert_eq!(title_from_markdown("# Hello\nbody"), Some("Hello".to_string()));
        assert_eq!(title_from_markdown("intro\n# Later heading"), Some("Later heading".to_string()));
        assert_eq!(title_from_markdown("## only a subheading"), None);
    }
}
