//! Tavily search provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::security::SecretString;
use crate::traits::{SearchResult, WebSearcher};

use super::{search_client, DEFAULT_SEARCH_TIMEOUT};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: String,
    title: Option<String>,
    content: Option<String>,
    score: Option<f32>,
}

/// Tavily-backed web searcher.
pub struct TavilySearcher {
    api_key: SecretString,
    client: reqwest::Client,
    endpoint: String,
    /// Results requested per query.
    pub default_limit: usize,
}

impl TavilySearcher {
    pub fn new(api_key: impl Into<SecretString>) -> CrawlResult<Self> {
        Ok(Self {
            api_key: api_key.into(),
            client: search_client(DEFAULT_SEARCH_TIMEOUT)?,
            endpoint: TAVILY_ENDPOINT.to_string(),
            default_limit: 10,
        })
    }

    /// Bound every search call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> CrawlResult<Self> {
        self.client = search_client(timeout)?;
        Ok(self)
    }

    /// Set the default result limit.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn try_search(&self, query: &str, limit: usize) -> CrawlResult<Vec<SearchResult>> {
        let request = TavilyRequest {
            query,
            search_depth: "basic",
            max_results: limit,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&request)
            .send()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(CrawlError::SearchApi {
                provider: "tavily",
                status: response.status().as_u16(),
            });
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(body.results.into_iter().filter_map(into_result).collect())
    }
}

fn into_result(r: TavilyResult) -> Option<SearchResult> {
    let mut result = SearchResult::from_url(&r.url)?;
    if let Some(title) = r.title {
        result = result.with_title(title);
    }
    if let Some(content) = r.content {
        result = result.with_snippet(content);
    }
    if let Some(score) = r.score {
        result = result.with_score(score);
    }
    Some(result)
}

#[async_trait]
impl WebSearcher for TavilySearcher {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search_with_limit(query, self.default_limit).await
    }

    async fn search_with_limit(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        match self.try_search(query, limit).await {
            Ok(results) => {
                debug!(query = %query, count = results.len(), "Tavily search complete");
                results
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Tavily search failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "tavily"
    }
}
