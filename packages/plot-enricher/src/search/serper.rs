//! Serper (Google results) search provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::security::SecretString;
use crate::traits::{SearchResult, WebSearcher};

use super::{search_client, DEFAULT_SEARCH_TIMEOUT};

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    link: String,
    title: Option<String>,
    snippet: Option<String>,
}

/// Serper-backed web searcher.
pub struct SerperSearcher {
    api_key: SecretString,
    client: reqwest::Client,
    endpoint: String,
}

impl SerperSearcher {
    pub fn new(api_key: impl Into<SecretString>) -> CrawlResult<Self> {
        Ok(Self {
            api_key: api_key.into(),
            client: search_client(DEFAULT_SEARCH_TIMEOUT)?,
            endpoint: SERPER_ENDPOINT.to_string(),
        })
    }

    /// Bound every search call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> CrawlResult<Self> {
        self.client = search_client(timeout)?;
        Ok(self)
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn try_search(&self, query: &str) -> CrawlResult<Vec<SearchResult>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose())
            .json(&SerperRequest { q: query })
            .send()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(CrawlError::SearchApi {
                provider: "serper",
                status: response.status().as_u16(),
            });
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(body.organic.into_iter().filter_map(into_result).collect())
    }
}

fn into_result(item: SerperOrganic) -> Option<SearchResult> {
    let mut result = SearchResult::from_url(&item.link)?;
    if let Some(title) = item.title {
        result = result.with_title(title);
    }
    if let Some(snippet) = item.snippet {
        result = result.with_snippet(snippet);
    }
    Some(result)
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.try_search(query).await {
            Ok(results) => {
                debug!(query = %query, count = results.len(), "Serper search complete");
                results
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Serper search failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_organic_results() {
        let body: SerperResponse = serde_json::from_str(
            r#"{
                "searchParameters": {"q": "Sholay 1975 movie synopsis"},
                "organic": [
                    {"title": "Sholay - Wikipedia", "link": "https://en.wikipedia.org/wiki/Sholay", "snippet": "Sholay is a 1975 film", "position": 1},
                    {"title": "Broken", "link": "", "position": 2},
                    {"link": "https://www.britannica.com/topic/Sholay", "position": 3}
                ]
            }"#,
        )
        .unwrap();

        let results: Vec<_> = body.organic.into_iter().filter_map(into_result).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("Sholay - Wikipedia"));
        assert_eq!(results[1].url.as_str(), "https://www.britannica.com/topic/Sholay");
    }

    #[test]
    fn test_missing_organic_is_empty() {
        let body: SerperResponse = serde_json::from_str(r#"{"answerBox": {}}"#).unwrap();
        assert!(body.organic.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_empty() {
        let searcher = SerperSearcher::new("test-key")
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/search");
        assert!(searcher.search("Test Film 2020 movie synopsis").await.is_empty());
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out_empty() {
        let (base, accepted) = crate::testing::silent_endpoint().await.unwrap();
        let searcher = SerperSearcher::new("test-key")
            .unwrap()
            .with_timeout(Duration::from_millis(300))
            .unwrap()
            .with_endpoint(format!("{}/search", base));

        let results = tokio::time::timeout(
            Duration::from_secs(5),
            searcher.search("Test Film 2020 movie synopsis"),
        )
        .await
        .expect("search should give up at its own timeout");

        assert!(results.is_empty());
        assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
