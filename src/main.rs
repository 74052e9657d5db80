// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr so stdout stays machine-readable)
// 3. Run the crawl engine, wired to Ctrl-C for graceful cancellation
// 4. Print the results, persist the JSON report, send the completion
//    notification
// 5. Exit with proper code (0 = clean run, 1 = ran with failures, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;       // src/cli.rs - command-line parsing
mod crawl;     // src/crawl/ - the traversal engine
mod error;     // src/error.rs - error kinds
mod extract;   // src/extract/ - title/summary/link extraction
mod notify;    // src/notify.rs - fire-and-forget notifications
mod report;    // src/report/ - page records and JSON persistence

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::CrawlEngine;
use error::CrawlError;
use notify::Notifier;
use report::CrawlReport;

// The #[tokio::main] attribute transforms our async main into a real main
// function. It creates a tokio runtime and runs our async code inside it.
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // An unexpected error occurred; print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// The main application logic
// Returns:
//   Ok(0) = crawl ran and the report was saved
//   Ok(1) = crawl ran, but pages failed or the report could not be saved
//   Ok(2) = the crawl could not start (invalid seed)
async fn run() -> Result<i32> {
    // Engine logs go to stderr so JSON on stdout stays clean.
    // Verbosity is controlled with RUST_LOG (e.g., RUST_LOG=site_scout=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "site_scout=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!("🕸️  Crawling: {}", cli.seed_url);
    println!(
        "📊 Max depth: {} | workers: {} | delay: {}ms",
        cli.max_depth, cli.workers, cli.delay_ms
    );

    let notifier = build_notifier(cli.notify_url.as_deref());
    let engine = CrawlEngine::new(cli.crawl_config(), notifier.clone())?;

    // Ctrl-C flips the cancellation signal; the engine stops issuing
    // fetches and hands back whatever it has gathered so far
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted - finishing with partial results...");
            let _ = cancel_tx.send(true);
        }
    });

    let report = match engine
        .crawl_with_cancel(&cli.seed_url, cli.max_depth, cancel_rx)
        .await
    {
        Ok(report) => report,
        Err(e @ CrawlError::InvalidSeed { .. }) => {
            eprintln!("Error: {}", e);
            return Ok(2);
        }
        Err(e) => return Err(e.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    let mut exit_code = if report.pages_failed > 0 { 1 } else { 0 };

    // Persistence failure doesn't lose the run - the summary (or JSON) is
    // already on stdout - but it must not look like a clean exit either
    match report::save(&report, &cli.output) {
        Ok(path) => println!("💾 Report saved to {}", path.display()),
        Err(e) => {
            eprintln!("Warning: {}", e);
            notifier.persistence_failed(&e);
            exit_code = 1;
        }
    }

    notifier.crawl_complete(report.total_pages()).await;

    Ok(exit_code)
}

// Builds the notifier, tolerating a malformed webhook URL
//
// A bad --notify-url downgrades to log-only notifications rather than
// blocking the crawl: notifications are best-effort by contract.
fn build_notifier(notify_url: Option<&str>) -> Notifier {
    match notify_url {
        Some(raw) => match url::Url::parse(raw) {
            Ok(webhook) => Notifier::new(Some(webhook)),
            Err(e) => {
                eprintln!("Warning: ignoring invalid --notify-url: {}", e);
                Notifier::disabled()
            }
        },
        None => Notifier::disabled(),
    }
}

// Prints the crawled pages as a human-readable table plus totals
fn print_summary(report: &CrawlReport) {
    println!();
    println!("{:<60} {:<7} {:<30}", "URL", "DEPTH", "TITLE");
    println!("{}", "=".repeat(98));

    for page in &report.pages {
        println!(
            "{:<60} {:<7} {:<30}",
            truncate(&page.url, 57),
            page.depth,
            truncate(&page.title, 27)
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Pages crawled: {}", report.total_pages());
    println!("   ❌ Pages failed: {}", report.pages_failed);
    println!("   🔗 Links discovered: {}", report.links_discovered);
    println!("   ⏱️  Duration: {:.1}s", report.duration_ms as f64 / 1000.0);
    if report.cancelled {
        println!("   ⚠️  Run was cancelled - results are partial");
    }
}

// Truncates a string for table display, appending "..." when cut
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}
