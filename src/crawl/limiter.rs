// src/crawl/limiter.rs
// =============================================================================
// This module implements the politeness delay as a token bucket shared by
// every fetch worker.
//
// The naive way to be polite is sleep(1s) before each request - but that
// couples politeness to single-threadedness. A shared token bucket
// decouples the two: any number of workers can run concurrently, yet
// requests leave the pool at most once per interval.
//
// We use the `governor` crate, which implements the GCRA algorithm (a
// precise token/leaky bucket) with an async until_ready() wait.
// =============================================================================

use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

// Paces requests across the whole worker pool
//
// A zero interval disables pacing entirely (handy for tests and local
// servers you own).
pub struct Politeness {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Politeness {
    // Creates a limiter that releases one request per `interval`
    pub fn new(interval: Duration) -> Self {
        // Quota::with_period returns None for a zero period, which is
        // exactly our "disabled" case
        let limiter = Quota::with_period(interval).map(RateLimiter::direct);
        Self { limiter }
    }

    // Waits until this caller is allowed to issue its next request
    //
    // This is one of only two suspension points in the engine (the other is
    // the fetch itself); no engine state is held across it.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a token bucket?
//    - Imagine a bucket that gains one token per interval
//    - Each request takes a token; no token means you wait
//    - Bursts are bounded by the bucket size (here: one token)
//
// 2. Why share one limiter instead of sleeping per worker?
//    - Four workers each sleeping 1s still hit the server 4x per second
//    - One shared bucket caps the *pool's* combined rate, which is what
//      "be polite to the remote server" actually means
//
// 3. What is until_ready()?
//    - governor's async wait: suspends the task until a token is available
//    - Other tasks keep running while this one waits (it's not a blocking
//      sleep)
// -----------------------------------------------------------------------------
