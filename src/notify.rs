// src/notify.rs
// =============================================================================
// This module sends fire-and-forget notifications about crawl progress.
//
// Every notification is logged through tracing; if a webhook URL is
// configured, it also gets a small JSON POST. Both sinks are best-effort:
// a notification that fails to deliver is logged and forgotten, and can
// never affect the crawl itself.
//
// Notification kinds:
// - page_failed: a single page was skipped (warning)
// - crawl_complete: the run finished, with a page count (success)
// - persistence_failed: the report could not be written (error)
// =============================================================================

use url::Url;

use crate::error::{CrawlError, PageError};

// Cheap to clone: the reqwest Client is reference-counted and the webhook
// URL is small
#[derive(Debug, Clone)]
pub struct Notifier {
    webhook: Option<Url>,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(webhook: Option<Url>) -> Self {
        Self {
            webhook,
            client: reqwest::Client::new(),
        }
    }

    // A notifier that only logs (no webhook configured)
    pub fn disabled() -> Self {
        Self::new(None)
    }

    // Alert that one page was skipped; the crawl is still running
    pub fn page_failed(&self, url: &Url, err: &PageError) {
        self.dispatch("warning", format!("crawler error on {}: {}", url, err));
    }

    // Announce a finished run
    //
    // Awaited by the caller (it is the last thing before exit), but any
    // delivery failure is still swallowed.
    pub async fn crawl_complete(&self, pages: usize) {
        self.deliver("success", format!("crawl complete - {} pages processed", pages))
            .await;
    }

    pub fn persistence_failed(&self, err: &CrawlError) {
        self.dispatch("error", format!("failed to save crawl report: {}", err));
    }

    // Fire-and-forget delivery: logs immediately, posts in a background task
    fn dispatch(&self, kind: &'static str, message: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.deliver(kind, message).await;
        });
    }

    // Logs the notification and, if configured, posts it to the webhook.
    // Never returns an error: a lost notification is a log line, nothing more.
    async fn deliver(&self, kind: &'static str, message: String) {
        tracing::info!(kind, %message, "notification");

        let Some(webhook) = self.webhook.clone() else {
            return;
        };

        let payload = serde_json::json!({
            "kind": kind,
            "message": message,
        });

        if let Err(e) = self.client.post(webhook).json(&payload).send().await {
            tracing::warn!(error = %e, "notification webhook failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_complete_notification_posts_to_webhook() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/hook")
                    .body_contains("crawl complete - 7 pages processed");
                then.status(200);
            })
            .await;

        let webhook = Url::parse(&server.url("/hook")).unwrap();
        Notifier::new(Some(webhook)).crawl_complete(7).await;

        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_swallowed() {
        // Port 9 (discard) is not listening; delivery must fail quietly
        let webhook = Url::parse("http://127.0.0.1:9/hook").unwrap();
        Notifier::new(Some(webhook)).crawl_complete(1).await;
    }

    #[tokio::test]
    async fn test_disabled_notifier_is_a_no_op() {
        Notifier::disabled().crawl_complete(3).await;
    }
}
