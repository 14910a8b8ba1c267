//! HTML parser for extracting content signals
//!
//! This module extracts the small set of fields used as matching evidence:
//! - Page title (from <title>)
//! - First-level heading (first <h1>)
//! - Meta description (<meta name="description" content="...">)
//! - An excerpt built from the first three paragraphs

use scraper::{ElementRef, Html, Selector};

/// Number of leading paragraphs that feed the excerpt
const EXCERPT_PARAGRAPHS: usize = 3;

/// Maximum excerpt length in characters
pub const EXCERPT_MAX_CHARS: usize = 500;

/// Signals extracted from an HTML page
///
/// Every field is optional: pages routinely lack a heading or a description,
/// and an absent element is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSignals {
    pub title: Option<String>,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
}

/// Parses HTML content and extracts the content signals
///
/// # Example
///
/// ```
/// use redirect_mapper::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><h1>Hello</h1><p>One</p></body></html>"#;
/// let page = parse_html(html);
/// assert_eq!(page.title.as_deref(), Some("Test"));
/// assert_eq!(page.heading.as_deref(), Some("Hello"));
/// assert_eq!(page.excerpt.as_deref(), Some("One"));
/// ```
pub fn parse_html(html: &str) -> PageSignals {
    let document = Html::parse_document(html);

    PageSignals {
        title: first_text(&document, "title"),
        heading: first_text(&document, "h1"),
        description: extract_description(&document),
        excerpt: extract_excerpt(&document),
    }
}

/// Trimmed text of the first element matching `selector`
fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Extracts the `content` attribute of the description meta tag
fn extract_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Joins the first paragraphs with single spaces, truncated to [`EXCERPT_MAX_CHARS`]
fn extract_excerpt(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;

    let joined = document
        .select(&selector)
        .take(EXCERPT_PARAGRAPHS)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");

    let excerpt: String = joined.chars().take(EXCERPT_MAX_CHARS).collect();

    if excerpt.trim().is_empty() {
        None
    } else {
        Some(excerpt)
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
