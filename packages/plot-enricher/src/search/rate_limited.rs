//! Rate-limited searcher wrapper.
//!
//! Wraps any WebSearcher with a request quota using the governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::traits::{SearchResult, WebSearcher};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A searcher wrapper that enforces a request quota.
pub struct RateLimitedSearcher<S: WebSearcher> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
}

impl<S: WebSearcher> RateLimitedSearcher<S> {
    /// Create a new rate-limited searcher.
    ///
    /// A rate of zero is treated as one request per second.
    pub fn new(searcher: S, requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(searcher, Quota::per_second(rate))
    }

    /// Create with a custom quota.
    pub fn with_quota(searcher: S, quota: Quota) -> Self {
        Self {
            inner: searcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// The wrapped searcher.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: WebSearcher> WebSearcher for RateLimitedSearcher<S> {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.limiter.until_ready().await;
        self.inner.search(query).await
    }

    async fn search_with_limit(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.limiter.until_ready().await;
        self.inner.search_with_limit(query, limit).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
