// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// site-scout is a single-purpose tool, so there are no subcommands: one
// positional seed URL plus tuning flags.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::crawl::CrawlConfig;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-scout",
    version,
    about = "Crawl a website and record page summaries and link maps",
    long_about = "site-scout explores a website from a seed URL up to a bounded depth, \
                  recording a title, a short content summary and the outbound links of \
                  every page it reaches. Results are written as one JSON file per run."
)]
pub struct Cli {
    /// Seed URL to start crawling from (e.g., https://example.com)
    pub seed_url: String,

    /// Maximum crawl depth; the seed page is depth 0
    #[arg(long, default_value_t = 3)]
    pub max_depth: usize,

    /// Number of concurrent fetch workers
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Politeness delay in milliseconds, shared across all workers (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Per-request fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Give up after this many seconds, keeping the partial result
    #[arg(long)]
    pub max_runtime_secs: Option<u64>,

    /// Directory where the JSON run file is written
    #[arg(long, default_value = "crawl-results")]
    pub output: PathBuf,

    /// Print the full report as JSON to stdout instead of a summary table
    #[arg(long)]
    pub json: bool,

    /// Webhook URL that receives completion and failure notifications
    #[arg(long)]
    pub notify_url: Option<String>,
}

impl Cli {
    // Translates the flag values into an engine configuration
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            workers: self.workers,
            delay: Duration::from_millis(self.delay_ms),
            fetch_timeout: Duration::from_secs(self.timeout_secs),
            max_runtime: self.max_runtime_secs.map(Duration::from_secs),
            ..CrawlConfig::default()
        }
    }
}
