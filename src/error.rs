// src/error.rs
// =============================================================================
// This file defines the error types for the crawler.
//
// There are two very different failure worlds here:
// - CrawlError: fatal problems that abort (or never start) a whole run,
//   like an unparseable seed URL or a report file that can't be written
// - PageError: per-page problems (dead link, timeout, binary payload) that
//   are logged, counted and skipped - one bad page must never kill the crawl
//
// Rust concepts:
// - thiserror: derive macro that generates Display + Error impls for enums
// - #[from]: automatic conversion so the ? operator works across error types
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

// Fatal errors returned from the engine or the persistence layer.
//
// These are the errors a caller is expected to match on:
// - InvalidSeed means the crawl never started (no I/O happened)
// - Client means the HTTP client itself could not be constructed
// - Persistence happens *after* the crawl; the report is still in hand
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL did not parse as an absolute http/https address
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    /// The underlying HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The crawl report could not be written to disk
    #[error("failed to persist crawl report to {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Per-page errors. These never cross the engine boundary as Err - the
// engine records them, alerts, and moves on to the next page.
#[derive(Debug, Error)]
pub enum PageError {
    /// The request itself failed (DNS, connect, timeout, body read, ...)
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered with a non-success status code
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response was not something we can parse as a page
    #[error("unparseable response: {0}")]
    Parse(String),
}
