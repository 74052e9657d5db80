// src/crawl/fetch.rs
// =============================================================================
// This module wraps reqwest into the one fetch operation the engine needs:
// give me the body of this URL, or a categorized PageError.
//
// Key behavior:
// - One shared Client (connection pooling) with a per-request timeout
// - A custom User-Agent so server operators can identify the crawler
// - Non-2xx statuses are failures, not bodies to parse
// - Obviously non-HTML payloads (images, archives, ...) are rejected
//   before we download the body
// =============================================================================

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::error::PageError;

// Identifies the crawler to remote servers
const USER_AGENT: &str = concat!("site-scout/", env!("CARGO_PKG_VERSION"), " (polite crawler)");

// Shared HTTP fetcher for the worker pool
//
// Client is internally reference-counted, so this struct is cheap to share
// behind an Arc.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    // Builds a fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    // Fetches one page body
    //
    // Returns:
    //   Ok(body) for a 2xx HTML response
    //   Err(PageError::Status) for non-2xx responses
    //   Err(PageError::Parse) for payloads we can't treat as a page
    //   Err(PageError::Fetch) for transport failures (DNS, timeout, ...)
    pub async fn fetch(&self, url: &Url) -> Result<String, PageError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status(status));
        }

        // Check the declared content type before pulling the body; fetching
        // a 200 MB tarball just to parse it as HTML helps nobody
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_parseable_content_type(content_type) {
                return Err(PageError::Parse(format!(
                    "unsupported content type '{}'",
                    content_type
                )));
            }
        }

        Ok(response.text().await?)
    }
}

// Decides whether a Content-Type header names something we can parse
//
// A missing header is treated as parseable (many small servers omit it);
// this only filters out declarations that are clearly not a page.
fn is_parseable_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';') // drop parameters like "; charset=utf-8"
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    matches!(
        mime.as_str(),
        "text/html" | "application/xhtml+xml" | "text/plain" | ""
    )
}
