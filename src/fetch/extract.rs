//! HTML extraction for fetched pages
//!
//! Pulls the title, the meta description and the outgoing links out of a
//! fetched document. Missing or malformed elements are reported as absent
//! rather than as errors.

use crate::fetch::PageMetadata;
use crate::url::is_in_scope;
use scraper::{Html, Selector};
use url::Url;

/// Extracts the `<title>` text and `<meta name="description">` content
///
/// Both values are trimmed. An element that exists but is empty still yields
/// `Some("")`; only a missing element yields `None`.
///
/// # Example
///
/// ```
/// use sitesweep::fetch::extract_metadata;
///
/// let html = r#"<html><head><title> Home </title></head></html>"#;
/// let meta = extract_metadata(html);
/// assert_eq!(meta.title.as_deref(), Some("Home"));
/// assert_eq!(meta.description, None);
/// ```
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    PageMetadata {
        title: extract_title(&document),
        description: extract_description(&document),
    }
}

/// Extracts all `<a href>` targets that start with `prefix`
///
/// Relative links are resolved against `base_url` first, the way a browser
/// reports `element.href`. Links that do not resolve to http(s) are dropped.
pub fn extract_links(html: &str, base_url: &Url, prefix: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|link| is_in_scope(link, prefix))
        .collect()
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

fn extract_description(document: &Html) -> Option<String> {
    let meta_selector = Selector::parse("meta[name=description]").ok()?;

    document
        .select(&meta_selector)
        .next()
        .map(|element| element.value().attr("content").unwrap_or("").trim().to_string())
}

/// Resolves a link href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
