// src/crawl/engine.rs
// =============================================================================
// This module implements the crawl traversal engine.
//
// How it works:
// 1. Normalize and claim the seed URL
// 2. Keep up to `workers` fetches in flight, fed from the frontier
// 3. Each fetch waits on the shared politeness limiter, downloads the page,
//    and extracts title / summary / outbound links
// 4. Completed pages become records; their links go back into the frontier
//    (depth + 1, already-claimed URLs skipped)
// 5. When the frontier is drained and nothing is in flight, the report is
//    finalized and returned
//
// Invariants:
// - A URL is claimed in the visited set *before* its fetch is dispatched,
//   so no URL is ever expanded twice, even with concurrent workers
// - Nothing deeper than max_depth is ever queued (enforced by Frontier)
// - A failed page is logged, alerted and counted - it never aborts the run
//
// The traversal state (frontier + visited set) lives entirely inside one
// crawl call. The scheduler loop is the only owner, so the claim step needs
// no locking: check-and-insert happens in a single task.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;
use url::Url;

use crate::crawl::fetch::Fetcher;
use crate::crawl::frontier::{Frontier, VisitedSet};
use crate::crawl::limiter::Politeness;
use crate::crawl::CrawlConfig;
use crate::error::{CrawlError, PageError};
use crate::extract;
use crate::notify::Notifier;
use crate::report::{CrawlReport, PageRecord};

// The crawl engine: configuration plus the shared collaborators every
// worker needs (HTTP fetcher, politeness limiter, notifier)
pub struct CrawlEngine {
    config: CrawlConfig,
    fetcher: Arc<Fetcher>,
    limiter: Arc<Politeness>,
    notifier: Notifier,
}

// What one dispatched fetch hands back to the scheduler
//
// url and depth ride along even on failure, so the scheduler can log and
// count without keeping its own in-flight bookkeeping.
struct PageOutcome {
    url: Url,
    depth: usize,
    result: Result<(PageRecord, Vec<Url>), PageError>,
}

impl CrawlEngine {
    pub fn new(mut config: CrawlConfig, notifier: Notifier) -> Result<Self, CrawlError> {
        // The scheduler can only dispatch while in_flight < workers, so a
        // zero would deadlock the refill loop before the seed is fetched
        config.workers = config.workers.max(1);

        let fetcher = Arc::new(Fetcher::new(config.fetch_timeout)?);
        let limiter = Arc::new(Politeness::new(config.delay));

        Ok(Self {
            config,
            fetcher,
            limiter,
            notifier,
        })
    }

    // Crawls from `seed` down to `max_depth`, with no external cancellation
    //
    // The seed page itself is depth 0; max_depth = 0 crawls just the seed.
    pub async fn crawl(&self, seed: &str, max_depth: usize) -> Result<CrawlReport, CrawlError> {
        // Keep the sender alive for the duration of the call - a dropped
        // sender reads as cancellation
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.crawl_with_cancel(seed, max_depth, cancel_rx).await
    }

    // Crawls from `seed`, honoring a caller-issued cancellation signal
    //
    // Sending `true` on the paired watch channel (or hitting the configured
    // max_runtime deadline) stops new fetches and drops in-flight ones; the
    // pages accumulated so far come back as a partial report.
    //
    // Returns Err only when the crawl cannot start at all (invalid seed).
    // Once started, the run always produces a report - zero successful
    // pages is a valid outcome, not an error.
    pub async fn crawl_with_cancel(
        &self,
        seed: &str,
        max_depth: usize,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<CrawlReport, CrawlError> {
        // The only fatal validation: everything after this point recovers
        let seed_url = extract::normalize_seed(seed)?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let deadline = self
            .config
            .max_runtime
            .map(|limit| tokio::time::Instant::now() + limit);

        tracing::info!(seed = %seed_url, max_depth, workers = self.config.workers, "starting crawl");

        // Traversal state is scoped to this invocation; independent crawls
        // share nothing
        let mut frontier = Frontier::new(max_depth);
        let mut visited = VisitedSet::new();
        frontier.push(seed_url, 0);

        let mut pages: Vec<PageRecord> = Vec::new();
        let mut pages_failed = 0usize;
        let mut links_discovered = 0usize;
        let mut cancelled = false;

        let mut in_flight = FuturesUnordered::new();

        loop {
            // Refill the worker pool from the frontier
            while in_flight.len() < self.config.workers {
                let Some((url, depth)) = frontier.pop() else {
                    break;
                };
                // Claim before any I/O; a URL that lost the race here was
                // already expanded (or is in flight) and is simply dropped
                if !visited.claim(&url) {
                    continue;
                }
                in_flight.push(expand(
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.limiter),
                    url,
                    depth,
                    self.config.max_links_per_page,
                ));
            }

            // Refill drained both the frontier and the pool: we're done
            if in_flight.is_empty() {
                debug_assert!(frontier.is_empty());
                break;
            }

            tokio::select! {
                Some(outcome) = in_flight.next() => {
                    self.handle_outcome(
                        outcome,
                        &mut frontier,
                        &visited,
                        &mut pages,
                        &mut pages_failed,
                        &mut links_discovered,
                    );
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        cancelled = true;
                    }
                }
                _ = wait_for_deadline(deadline) => {
                    tracing::warn!("crawl deadline reached");
                    cancelled = true;
                }
            }

            if cancelled {
                // Stop issuing fetches and drop the in-flight ones; the
                // records gathered so far form the partial result
                tracing::warn!(
                    pages = pages.len(),
                    pending = frontier.len(),
                    "crawl cancelled, returning partial result"
                );
                break;
            }
        }

        let report = CrawlReport {
            seed: seed.to_string(),
            max_depth,
            started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
            cancelled,
            pages_failed,
            links_discovered,
            pages,
        };

        tracing::info!(
            pages = report.total_pages(),
            failed = report.pages_failed,
            visited = visited.len(),
            duration_ms = report.duration_ms,
            "crawl finished"
        );

        Ok(report)
    }

    // Folds one completed fetch into the traversal state
    fn handle_outcome(
        &self,
        outcome: PageOutcome,
        frontier: &mut Frontier,
        visited: &VisitedSet,
        pages: &mut Vec<PageRecord>,
        pages_failed: &mut usize,
        links_discovered: &mut usize,
    ) {
        match outcome.result {
            Ok((record, links)) => {
                *links_discovered += links.len();
                for link in links {
                    // Frontier enforces the depth bound; the visited check
                    // here just keeps obvious repeats out of the queue (the
                    // claim at dispatch is what actually guarantees
                    // exactly-once)
                    if !visited.contains(&link) {
                        frontier.push(link, outcome.depth + 1);
                    }
                }
                tracing::info!(url = %outcome.url, depth = outcome.depth, "crawled page");
                pages.push(record);
            }
            Err(err) => {
                *pages_failed += 1;
                tracing::error!(url = %outcome.url, error = %err, "failed to crawl page");
                // Non-fatal alert; the run continues regardless
                self.notifier.page_failed(&outcome.url, &err);
            }
        }
    }
}

// Fetches and extracts one page
//
// This is the whole per-page pipeline: politeness wait, fetch, parse.
// Nothing here touches shared traversal state - workers only compute, the
// scheduler integrates.
async fn expand(
    fetcher: Arc<Fetcher>,
    limiter: Arc<Politeness>,
    url: Url,
    depth: usize,
    max_links: usize,
) -> PageOutcome {
    limiter.acquire().await;

    let result = match fetcher.fetch(&url).await {
        Ok(body) => {
            let parsed = extract::parse_page(&body, &url, max_links);
            let record = PageRecord {
                url: url.to_string(),
                title: parsed.title,
                depth,
                fetched_at: Utc::now(),
                links: parsed.links.iter().map(Url::to_string).collect(),
                content_summary: parsed.summary,
            };
            Ok((record, parsed.links))
        }
        Err(err) => Err(err),
    };

    PageOutcome { url, depth, result }
}

// Resolves when the optional deadline passes; pends forever without one
async fn wait_for_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashSet;
    use std::time::Duration;

    fn test_config() -> CrawlConfig {
        CrawlConfig {
            workers: 4,
            delay: Duration::ZERO, // no politeness delay against our own mock
            fetch_timeout: Duration::from_secs(2),
            max_links_per_page: 5,
            max_runtime: None,
        }
    }

    fn engine_with(config: CrawlConfig) -> CrawlEngine {
        CrawlEngine::new(config, Notifier::disabled()).unwrap()
    }

    fn engine() -> CrawlEngine {
        engine_with(test_config())
    }

    // Builds a minimal HTML page with the given title and hrefs
    fn page(title: &str, hrefs: &[&str]) -> String {
        let links: String = hrefs
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();
        format!(
            "<html><head><title>{}</title></head><body><p>some content</p>{}</body></html>",
            title, links
        )
    }

    async fn html_mock<'a>(
        server: &'a MockServer,
        path: &str,
        body: String,
    ) -> httpmock::Mock<'a> {
        let path = path.to_string();
        server
            .mock_async(move |when, then| {
                when.method(GET).path(path);
                then.status(200)
                    .header("content-type", "text/html")
                    .body(body);
            })
            .await
    }

    #[tokio::test]
    async fn test_single_page_site() {
        let server = MockServer::start_async().await;
        html_mock(&server, "/", page("Home", &[])).await;

        let report = engine().crawl(&server.url("/"), 3).await.unwrap();

        assert_eq!(report.total_pages(), 1);
        assert_eq!(report.pages[0].title, "Home");
        assert_eq!(report.pages[0].depth, 0);
        assert!(report.pages[0].links.is_empty());
        assert!(report.pages[0].content_summary.contains("some content"));
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_depth_limit_cuts_off_expansion() {
        let server = MockServer::start_async().await;
        html_mock(&server, "/", page("Seed", &["/a", "/b", "/c"])).await;
        html_mock(&server, "/a", page("A", &["/deep"])).await;
        html_mock(&server, "/b", page("B", &["/deep"])).await;
        html_mock(&server, "/c", page("C", &["/deep"])).await;
        let deep = html_mock(&server, "/deep", page("Deep", &[])).await;

        let report = engine().crawl(&server.url("/"), 1).await.unwrap();

        // 1 seed + 3 children, and the depth-2 page was never even fetched
        assert_eq!(report.total_pages(), 4);
        assert!(report.pages.iter().all(|p| p.depth <= 1));
        assert_eq!(deep.hits_async().await, 0);

        // The depth-1 records still list /deep as an outbound link - it was
        // extracted, just never expanded
        let a = report.pages.iter().find(|p| p.title == "A").unwrap();
        assert_eq!(a.links.len(), 1);
    }

    #[tokio::test]
    async fn test_no_url_is_expanded_twice() {
        let server = MockServer::start_async().await;
        // The seed links to itself, to /a twice, and /a links back to the seed
        let seed_mock = html_mock(&server, "/", page("Seed", &["/", "/a", "/a"])).await;
        html_mock(&server, "/a", page("A", &["/"])).await;

        let report = engine().crawl(&server.url("/"), 3).await.unwrap();

        assert_eq!(report.total_pages(), 2);
        let urls: HashSet<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls.len(), report.total_pages(), "duplicate URL in records");
        // The visited set rejected every rediscovery of the seed
        assert_eq!(seed_mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_failed_page_does_not_abort_the_run() {
        let server = MockServer::start_async().await;
        html_mock(&server, "/", page("Seed", &["/a", "/b", "/c"])).await;
        html_mock(&server, "/a", page("A", &[])).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/b");
                then.status(500);
            })
            .await;
        html_mock(&server, "/c", page("C", &[])).await;

        let report = engine().crawl(&server.url("/"), 1).await.unwrap();

        let titles: HashSet<&str> = report.pages.iter().map(|p| p.title.as_str()).collect();
        assert!(titles.contains("Seed"));
        assert!(titles.contains("A"));
        assert!(titles.contains("C"));
        assert_eq!(report.total_pages(), 3); // /b is skipped, not recorded
        assert_eq!(report.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_seed_timeout_yields_empty_report() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(page("Slow", &[]))
                    .delay(Duration::from_millis(400));
            })
            .await;

        let mut config = test_config();
        config.fetch_timeout = Duration::from_millis(100);
        let report = engine_with(config).crawl(&server.url("/"), 2).await.unwrap();

        // "ran with zero successes", not "failed to start"
        assert_eq!(report.total_pages(), 0);
        assert_eq!(report.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_zero_workers_still_crawls() {
        let server = MockServer::start_async().await;
        html_mock(&server, "/", page("Home", &[])).await;

        let mut config = test_config();
        config.workers = 0; // clamped to one inside the engine
        let report = engine_with(config).crawl(&server.url("/"), 1).await.unwrap();

        assert_eq!(report.total_pages(), 1);
    }

    #[tokio::test]
    async fn test_invalid_seed_fails_before_any_work() {
        let result = engine().crawl("not a url", 3).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }

    #[tokio::test]
    async fn test_fan_out_is_capped() {
        let server = MockServer::start_async().await;
        html_mock(
            &server,
            "/",
            page("Seed", &["/p1", "/p2", "/p3", "/p4", "/p5", "/p6", "/p7"]),
        )
        .await;
        for path in ["/p1", "/p2", "/p3", "/p4", "/p5"] {
            html_mock(&server, path, page(path, &[])).await;
        }
        let p6 = html_mock(&server, "/p6", page("p6", &[])).await;

        let report = engine().crawl(&server.url("/"), 1).await.unwrap();

        let seed = report.pages.iter().find(|p| p.depth == 0).unwrap();
        assert_eq!(seed.links.len(), 5);
        assert_eq!(report.total_pages(), 6); // seed + five capped links
        assert_eq!(p6.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_depth_bound_holds_on_a_chain() {
        let server = MockServer::start_async().await;
        html_mock(&server, "/", page("d0", &["/d1"])).await;
        html_mock(&server, "/d1", page("d1", &["/d2"])).await;
        html_mock(&server, "/d2", page("d2", &["/d3"])).await;
        let d3 = html_mock(&server, "/d3", page("d3", &[])).await;

        let report = engine().crawl(&server.url("/"), 2).await.unwrap();

        assert_eq!(report.total_pages(), 3);
        assert!(report.pages.iter().all(|p| p.depth <= 2));
        assert_eq!(d3.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_deadline_returns_partial_report() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(page("Slow", &[]))
                    .delay(Duration::from_millis(400));
            })
            .await;

        let mut config = test_config();
        config.max_runtime = Some(Duration::from_millis(50));
        let report = engine_with(config).crawl(&server.url("/"), 2).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.total_pages(), 0);
        // We gave up at the deadline instead of waiting out the slow fetch
        assert!(report.duration_ms < 350);
    }

    #[tokio::test]
    async fn test_caller_cancellation_keeps_progress() {
        let server = MockServer::start_async().await;
        html_mock(&server, "/", page("Seed", &["/slow"])).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(page("Slow", &[]))
                    .delay(Duration::from_millis(500));
            })
            .await;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let _ = cancel_tx.send(true);
        });

        let report = engine()
            .crawl_with_cancel(&server.url("/"), 2, cancel_rx)
            .await
            .unwrap();

        // The seed finished before the signal; the slow child was dropped
        assert!(report.cancelled);
        assert_eq!(report.total_pages(), 1);
        assert_eq!(report.pages[0].title, "Seed");
    }
}
