//! Search providers.
//!
//! [`SerperSearcher`] is the default; [`TavilySearcher`] is selectable by
//! configuration. With no credential configured the pipeline runs against
//! [`NoopSearcher`], which finds nothing.

pub mod rate_limited;
pub mod serper;
pub mod tavily;

pub use rate_limited::RateLimitedSearcher;
pub use serper::SerperSearcher;
pub use tavily::TavilySearcher;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::{SearchResult, WebSearcher};

/// Upper bound on one search API call, connect to last byte.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for search APIs with a total request timeout.
pub(crate) fn search_client(timeout: Duration) -> CrawlResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CrawlError::Http(Box::new(e)))
}

/// Searcher used when no search credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSearcher;

#[async_trait]
impl WebSearcher for NoopSearcher {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        tracing::debug!(query = %query, "No search provider configured");
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
