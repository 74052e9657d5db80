// src/report/mod.rs
// =============================================================================
// This module defines the crawl output: one PageRecord per visited page,
// bundled into a CrawlReport, persisted as a single JSON document per run.
//
// The report is a complete, self-contained snapshot - it holds no handles
// into engine state, so it can outlive the engine, be serialized, shipped
// around, or deserialized by another tool.
//
// Persistence contract:
// - one file per run, named crawl_results_<unix-seconds>.json
// - written once at run completion (never appended to)
// - a write failure is surfaced as CrawlError::Persistence, but the report
//   value itself is still in the caller's hands
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrawlError;

// Everything we keep about one crawled page
//
// Immutable once created: the engine builds it and appends it, nothing
// mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Normalized URL the page was fetched from
    pub url: String,
    /// Page title, or "No Title" when the page has none
    pub title: String,
    /// Link distance from the seed (seed = 0)
    pub depth: usize,
    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
    /// Outbound links in document order, capped to the fan-out limit
    pub links: Vec<String>,
    /// Whitespace-collapsed visible text, truncated to 500 characters
    pub content_summary: String,
}

// The result of one whole crawl run
#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlReport {
    /// The seed URL as the caller passed it
    pub seed: String,
    pub max_depth: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// True when the run was cut short by cancellation or deadline
    pub cancelled: bool,
    /// Pages that failed to fetch or parse (skipped, not recorded)
    pub pages_failed: usize,
    /// Outbound links extracted across all pages (post-cap)
    pub links_discovered: usize,
    /// One record per successfully crawled page
    pub pages: Vec<PageRecord>,
}

impl CrawlReport {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }
}

// Writes the report to `dir` as a pretty-printed JSON file
//
// The directory is created if missing. Returns the path of the written
// file so the caller can tell the user where it landed.
pub fn save(report: &CrawlReport, dir: &Path) -> Result<PathBuf, CrawlError> {
    fs::create_dir_all(dir).map_err(|e| CrawlError::Persistence {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let filename = format!("crawl_results_{}.json", report.started_at.timestamp());
    let path = dir.join(filename);

    let json = serde_json::to_vec_pretty(report).map_err(|e| CrawlError::Persistence {
        path: path.clone(),
        source: e.into(),
    })?;

    fs::write(&path, json).map_err(|e| CrawlError::Persistence {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}
