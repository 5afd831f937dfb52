//! Sitemap generation.
//!
//! The sitemap covers the static marketing/browse routes plus one entry per
//! blog post. Freshness metadata follows the storefront's publishing rhythm:
//! the home page and blog index change daily, everything else weekly; the home
//! page carries top priority, blog posts slightly less than the other pages.

use anyhow::Context;
use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Page routes that always appear in the sitemap.
pub const STATIC_ROUTES: &[&str] = &["/", "/marketplace", "/pricing", "/faq", "/blog", "/ideas", "/concepts"];

fn changefreq_for(path: &str) -> &'static str {
    match path {
        "/" | "/blog" => "daily",
        _ => "weekly",
    }
}

fn priority_for(path: &str) -> &'static str {
    match path {
        "/" => "1.0",
        _ => "0.8",
    }
}

/// Build the sitemap XML document: one `<url>` per static route and one per
/// `/blog/<slug>`.
pub fn build(base_url: &str, blog_slugs: &[String], today: NaiveDate) -> anyhow::Result<String> {
    let base = base_url.trim_end_matches('/');
    let lastmod = today.format("%Y-%m-%d").to_string();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("write xml declaration")?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", "http://www.sitemaps.org/schemas/sitemap/0.9"));
    writer.write_event(Event::Start(urlset)).context("open urlset")?;

    for route in STATIC_ROUTES {
        write_url(
            &mut writer,
            &format!("{base}{route}"),
            &lastmod,
            changefreq_for(route),
            priority_for(route),
        )?;
    }

    for slug in blog_slugs {
        write_url(&mut writer, &format!("{base}/blog/{slug}"), &lastmod, "weekly", "0.7")?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset"))).context("close urlset")?;

    String::from_utf8(writer.into_inner()).context("sitemap is not valid UTF-8")
}

fn write_url(writer: &mut Writer<Vec<u8>>, loc: &str, lastmod: &str, changefreq: &str, priority: &str) -> anyhow::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url"))).context("open url")?;
    for (tag, text) in [("loc", loc), ("lastmod", lastmod), ("changefreq", changefreq), ("priority", priority)] {
        writer.write_event(Event::Start(BytesStart::new(tag))).context("open tag")?;
        writer.write_event(Event::Text(BytesText::new(text))).context("write text")?;
        writer.write_event(Event::End(BytesEnd::new(tag))).context("close tag")?;
    }
    writer.write_event(Event::End(BytesEnd::new("url"))).context("close url")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    fn slugs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entry_count_is_static_plus_blog() {
        let xml = build("https://bayfront.example.com", &slugs(&["a", "b", "c"]), test_date()).unwrap();
        let urls = xml.matches("<url>").count();
        assert_eq!(urls, STATIC_ROUTES.len() + 3);
        assert_eq!(xml.matches("</url>").count(), urls);
    }

    #[test]
    fn test_home_entry_has_top_priority_and_daily_freshness() {
        let xml = build("https://bayfront.example.com", &[], test_date()).unwrap();
        let home_entry = xml
            .split("<url>")
            .find(|entry| entry.contains("<loc>https://bayfront.example.com/</loc>"))
            .expect("home entry present");
        assert!(home_entry.contains("<priority>1.0</priority>"));
        assert!(home_entry.contains("<changefreq>daily</changefreq>"));
    }

    #[test]
    fn test_blog_posts_get_reduced_priority() {
        let xml = build("https://bayfront.example.com", &slugs(&["launch-checklist"]), test_date()).unwrap();
        let post_entry = xml
            .split("<url>")
            .find(|entry| entry.contains("/blog/launch-checklist</loc>"))
            .expect("blog post entry present");
        assert!(post_entry.contains("<priority>0.7</priority>"));
        assert!(post_entry.contains("<changefreq>weekly</changefreq>"));
    }

    #[test]
    fn test_blog_index_changes_daily_but_other_pages_weekly() {
        let xml = build("https://bayfront.example.com", &[], test_date()).unwrap();
        let blog_index = xml
            .split("<url>")
            .find(|entry| entry.contains("<loc>https://bayfront.example.com/blog</loc>"))
            .expect("blog index present");
        assert!(blog_index.contains("<changefreq>daily</changefreq>"));

        let pricing = xml
            .split("<url>")
            .find(|entry| entry.contains("/pricing</loc>"))
            .expect("pricing present");
        assert!(pricing.contains("<changefreq>weekly</changefreq>"));
        assert!(pricing.contains("<priority>0.8</priority>"));
    }

    #[test]
    fn test_lastmod_is_the_generation_date() {
        let xml = build("https://bayfront.example.com", &[], test_date()).unwrap();
        assert!(xml.contains("<lastmod>2026-01-04</lastmod>"));
    }

    #[test]
    fn test_trailing_slash_on_base_url_is_tolerated() {
        let xml = build("https://bayfront.example.com/", &[], test_date()).unwrap();
        assert!(xml.contains("<loc>https://bayfront.example.com/marketplace</loc>"));
        assert!(!xml.contains(".com//marketplace"));
    }

    #[test]
    fn test_document_shape() {
        let xml = build("https://bayfront.example.com", &slugs(&["a"]), test_date()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\""));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }
}
