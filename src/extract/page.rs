// src/extract/page.rs
// =============================================================================
// This module extracts the interesting parts of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to:
// - Parse and validate URLs
// - Resolve relative URLs to absolute URLs
//
// What we pull out of a page:
// - title: the first <title> element's text, or "No Title"
// - content summary: visible text with script/style removed, whitespace
//   collapsed, cut to the first 500 characters
// - outbound links: href targets resolved against the page URL, filtered
//   to http/https, then capped to the first few survivors
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use crate::error::CrawlError;

/// Maximum length of a content summary, in characters
pub const SUMMARY_MAX_CHARS: usize = 500;

// Title used when a page has no <title> element (or an empty one)
const TITLE_FALLBACK: &str = "No Title";

// The result of parsing one page
//
// `links` keeps the `Url` form so the engine can enqueue them without
// re-parsing; the record layer stringifies them for serialization.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub title: String,
    pub summary: String,
    pub links: Vec<Url>,
}

// Parses an HTML body into title, summary and outbound links
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   page_url: the URL the body was fetched from (for resolving relative links)
//   max_links: fan-out cap - how many outbound links to keep
//
// The cap is applied *after* filtering out unusable hrefs (mailto:,
// javascript:, fragment-only, ...), so a page whose first hrefs are all
// mailto: still contributes real links up to the cap.
pub fn parse_page(html: &str, page_url: &Url, max_links: usize) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        summary: extract_summary(&document),
        links: extract_links(&document, page_url, max_links),
    }
}

// Extracts the text of the first <title> element
//
// Falls back to "No Title" when the element is missing or blank, so every
// page record has a usable title field.
fn extract_title(document: &Html) -> String {
    // Selector::parse returns Result, so we use .unwrap() which panics on
    // error. This is OK here because our selector is a constant and known
    // to be valid.
    let selector = Selector::parse("title").unwrap();

    let title = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    if title.is_empty() {
        TITLE_FALLBACK.to_string()
    } else {
        title
    }
}

// Builds a bounded plain-text summary of the page
//
// Steps:
// 1. Collect every text node whose enclosing element is not a <script>,
//    <style> or <noscript> - their text is code, not content
// 2. Collapse every whitespace run to a single space
// 3. Truncate to the first SUMMARY_MAX_CHARS characters
fn extract_summary(document: &Html) -> String {
    let mut text = String::new();

    // Walk the parsed tree rather than the raw bytes: html5ever has
    // already normalized tag case and attribute quoting for us, so
    // <SCRIPT> and <script type=module> are plain "script" elements here
    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let in_skipped_subtree = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"))
        });

        if !in_skipped_subtree {
            text.push_str(fragment);
            text.push(' ');
        }
    }

    // split_whitespace() treats any run of spaces/newlines/tabs as one
    // separator, which gives us the collapsed form in a single pass
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    // Truncate by characters, not bytes, so we never split a multi-byte
    // character in half
    if collapsed.chars().count() > SUMMARY_MAX_CHARS {
        collapsed.chars().take(SUMMARY_MAX_CHARS).collect()
    } else {
        collapsed
    }
}

// Extracts outbound links from the page, in document order
//
// Every href is resolved against page_url, normalized, filtered to
// http/https, and then the list is capped to max_links entries.
fn extract_links(document: &Html, page_url: &Url, max_links: usize) -> Vec<Url> {
    let selector = Selector::parse("a[href]").unwrap();

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| normalize_link(page_url, href))
        .take(max_links)
        .collect()
}

// Resolves a possibly-relative href to a normalized absolute URL
//
// Parameters:
//   base: the URL of the page the href appeared on
//   href: the raw href attribute value
//
// Returns: Some(url) for crawlable http/https targets, None otherwise
//
// Normalization rules:
// - relative hrefs are resolved against the base (like a browser does)
// - the fragment is stripped, so /page and /page#section are one entity
// - non-web schemes (mailto:, javascript:, tel:, data:, ...) are rejected
// - fragment-only hrefs are rejected (they point back at the same page)
pub fn normalize_link(base: &Url, href: &str) -> Option<Url> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);

    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

// Validates and normalizes the seed URL for a crawl
//
// This is the one place where a bad URL is fatal: a seed that doesn't parse
// means the crawl never starts, which is a different failure from a page
// that breaks mid-run.
pub fn normalize_seed(raw: &str) -> Result<Url, CrawlError> {
    let mut url = Url::parse(raw).map_err(|e| CrawlError::InvalidSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::InvalidSeed {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().is_none() {
        return Err(CrawlError::InvalidSeed {
            url: raw.to_string(),
            reason: "URL has no host".to_string(),
        });
    }

    // Same normalization as discovered links, so a seed rediscovered via a
    // link hits the visited set
    url.set_fragment(None);
    Ok(url)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why strip the fragment?
//    - https://example.com/page and https://example.com/page#intro are the
//      same document as far as the server is concerned
//    - If we kept fragments, the visited set would fetch the page once per
//      anchor - stripping them makes both forms one entity
//
// 2. What does base.join(href) do?
//    - It resolves a relative reference exactly like a browser would
//    - "docs/" + "../about" = sibling path, "/top" = site root, and a full
//      "https://..." href just replaces the base entirely
//
// 3. Why cap after filtering instead of before?
//    - A page might start with a dozen mailto: links before its real
//      navigation - capping first would throw away everything useful
//    - Filtering first means the cap always counts crawlable links
//
// 4. Why chars().take() instead of slicing?
//    - String indices in Rust are byte offsets, and slicing in the middle
//      of a multi-byte character panics
//    - chars().take(n) walks character boundaries, which is always safe
// -----------------------------------------------------------------------------
