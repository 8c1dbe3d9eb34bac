//! Web searcher trait for plot discovery.
//!
//! The orchestrator never knows which search API is behind a query. It only
//! needs an ordered list of candidate URLs, and treats an empty list as "try
//! the next phrasing". Providers therefore swallow their own failures: the
//! fallible request lives in each provider, the trait method is infallible.
//!
//! ```rust,ignore
//! let searcher = SerperSearcher::new(api_key)?;
//!
//! for result in searcher.search("Sholay 1975 plot summary wikipedia").await {
//!     println!("Found: {} - {:?}", result.url, result.title);
//! }
//! ```

use async_trait::async_trait;
use url::Url;

/// A discovered URL from web search with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The discovered URL.
    pub url: Url,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Snippet/description from search results.
    pub snippet: Option<String>,

    /// Relevance score (0.0-1.0, if provided by search API).
    pub score: Option<f32>,
}

impl SearchResult {
    /// Create a new search result from a URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: None,
            snippet: None,
            score: None,
        }
    }

    /// Create from a URL string.
    pub fn from_url(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(Self::new)
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Add a relevance score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Keyword search over the open web.
///
/// # Implementations
///
/// - `SerperSearcher` - Serper (Google results)
/// - `TavilySearcher` - Tavily API
/// - `NoopSearcher` - no credential configured
/// - `RateLimitedSearcher` - wraps any of the above
/// - `MockWebSearcher` - for testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web for URLs relevant to the query.
    ///
    /// Results are in provider rank order. Transport, authorization and
    /// parse failures are logged by the provider and come back empty.
    async fn search(&self, query: &str) -> Vec<SearchResult>;

    /// Search with a specific result limit.
    async fn search_with_limit(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let mut results = self.search(query).await;
        results.truncate(limit);
        results
    }

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: WebSearcher + ?Sized> WebSearcher for std::sync::Arc<T> {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        (**self).search(query).await
    }

    async fn search_with_limit(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        (**self).search_with_limit(query, limit).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
