// src/crawl/frontier.rs
// =============================================================================
// This module holds the two pieces of traversal state:
//
// - Frontier: the pending-work queue of (URL, depth) pairs not yet expanded
// - VisitedSet: the URLs already claimed for fetching
//
// Both are created fresh inside each crawl() call and dropped when it
// returns, so two crawls in the same process can never see each other's
// state.
//
// The depth bound lives *inside* the frontier: a pair deeper than max_depth
// is refused at push time, so nothing past the horizon can even be queued.
//
// Rust concepts:
// - HashSet: To track visited URLs (O(1) lookup)
// - VecDeque: Double-ended queue holding the pending pages
// =============================================================================

use std::collections::{HashSet, VecDeque};

use url::Url;

// Pending pages, in discovery order
//
// The scheduler pops from the front and pushes discovered links to the
// back, so pages are expanded in the order their parents found them.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<(Url, usize)>,
    max_depth: usize,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max_depth,
        }
    }

    // Queues a URL for expansion
    //
    // Returns false (and queues nothing) when depth exceeds the bound.
    // This is the invariant that keeps the whole crawl finite:
    // no pair with depth > max_depth ever enters the queue.
    pub fn push(&mut self, url: Url, depth: usize) -> bool {
        if depth > self.max_depth {
            return false;
        }
        self.queue.push_back((url, depth));
        true
    }

    pub fn pop(&mut self) -> Option<(Url, usize)> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

// URLs already claimed for fetching
//
// A URL is claimed *before* its fetch is dispatched, not after it
// completes - that way a link discovered while the page is still in flight
// cannot be queued a second time.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Claims a URL for expansion
    //
    // Check and insert happen as one step (HashSet::insert reports whether
    // the value was new), so a URL can be claimed at most once per crawl.
    //
    // Returns: true if this caller got the claim, false if someone already
    // holds it
    pub fn claim(&mut self, url: &Url) -> bool {
        self.seen.insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_frontier_is_fifo() {
        let mut frontier = Frontier::new(3);
        frontier.push(url("https://example.com/a"), 0);
        frontier.push(url("https://example.com/b"), 1);

        assert_eq!(frontier.pop().unwrap().0.as_str(), "https://example.com/a");
        assert_eq!(frontier.pop().unwrap().0.as_str(), "https://example.com/b");
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_frontier_rejects_beyond_max_depth() {
        let mut frontier = Frontier::new(2);
        assert!(frontier.push(url("https://example.com/ok"), 2));
        assert!(!frontier.push(url("https://example.com/deep"), 3));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_frontier_depth_zero_bound() {
        // max_depth = 0 means "just the seed"
        let mut frontier = Frontier::new(0);
        assert!(frontier.push(url("https://example.com/"), 0));
        assert!(!frontier.push(url("https://example.com/child"), 1));
    }

    #[test]
    fn test_visited_claims_only_once() {
        let mut visited = VisitedSet::new();
        let target = url("https://example.com/page");

        assert!(visited.claim(&target));
        assert!(!visited.claim(&target));
        assert!(visited.contains(&target));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_visited_sets_are_independent() {
        let mut first = VisitedSet::new();
        let mut second = VisitedSet::new();
        let target = url("https://example.com/page");

        assert!(first.claim(&target));
        // A different crawl's set knows nothing about the first
        assert!(second.claim(&target));
    }
}
