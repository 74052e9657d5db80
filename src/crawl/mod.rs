// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine: traversal, politeness, and fetching.
//
// Submodules:
// - engine: the scheduler loop and per-page pipeline
// - frontier: pending-work queue + visited set (the traversal invariants)
// - fetch: HTTP fetching with timeout and status/content-type checks
// - limiter: token-bucket politeness delay shared across workers
//
// This file (mod.rs) is the module root - it holds the engine configuration
// and re-exports the public API.
// =============================================================================

mod engine;
mod fetch;
mod frontier;
mod limiter;

pub use engine::CrawlEngine;

use std::time::Duration;

/// Default fan-out cap: outbound links kept per page
pub const DEFAULT_MAX_LINKS_PER_PAGE: usize = 5;

// Tuning knobs for one engine instance
//
// The defaults match a polite public-web crawl: a handful of workers, one
// request per second across the pool, and a generous per-fetch timeout.
//
// Worst-case page count is bounded by these numbers: with fan-out N and
// depth D it is the sum of N^d for d = 0..=D (about 156 pages for the
// default N=5, D=3). Raise either knob with that ceiling in mind.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Concurrent fetch workers
    pub workers: usize,
    /// Politeness interval shared by all workers (zero disables pacing)
    pub delay: Duration,
    /// Per-request fetch timeout
    pub fetch_timeout: Duration,
    /// Fan-out cap: outbound links kept per page
    pub max_links_per_page: usize,
    /// Optional whole-crawl deadline; on expiry the partial result is kept
    pub max_runtime: Option<Duration>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            delay: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(10),
            max_links_per_page: DEFAULT_MAX_LINKS_PER_PAGE,
            max_runtime: None,
        }
    }
}
