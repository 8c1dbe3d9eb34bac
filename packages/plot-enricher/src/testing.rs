//! Testing utilities including mock implementations.
//!
//! These let the whole enrichment pipeline run without search, network or
//! generation calls, and without waiting on real delays.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::GenerationError;
use crate::traits::{FetchedPage, PageFetcher, SearchResult, Sleeper, TextGenerator, WebSearcher};

/// A mock web searcher.
///
/// Returns predefined results per query, or a fallback list for any query
/// without its own entry.
#[derive(Default)]
pub struct MockWebSearcher {
    results: Arc<RwLock<HashMap<String, Vec<SearchResult>>>>,
    fallback: Arc<RwLock<Vec<SearchResult>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockWebSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add results for a query.
    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(query.to_string(), results);
        self
    }

    /// Add URL strings as results for a query.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        let results: Vec<_> = urls
            .iter()
            .filter_map(|u| SearchResult::from_url(u))
            .collect();
        self.with_results(query, results)
    }

    /// Return these URLs for every query without its own results.
    pub fn with_fallback_urls(self, urls: &[&str]) -> Self {
        *self.fallback.write().unwrap() = urls
            .iter()
            .filter_map(|u| SearchResult::from_url(u))
            .collect();
        self
    }

    /// Queries received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.calls.write().unwrap().push(query.to_string());

        self.results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.fallback.read().unwrap().clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A mock page fetcher.
///
/// Serves predefined HTML by URL; unknown URLs fetch as `None`.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        self.pages
            .write()
            .unwrap()
            .insert(url.clone(), FetchedPage::html(url, html));
        self
    }

    /// URLs fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());
        self.pages.read().unwrap().get(url).cloned()
    }
}

/// A mock text generator.
///
/// Plays back scripted replies and errors in order. Once the script runs
/// out it repeats the last scripted reply, or fails permanently if there
/// never was one.
#[derive(Default)]
pub struct MockGenerator {
    script: Arc<RwLock<VecDeque<Result<String, GenerationError>>>>,
    last_reply: Arc<RwLock<Option<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockGenerator {
    /// Create a new mock generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.script.write().unwrap().push_back(Ok(reply.into()));
        self
    }

    /// Queue an error.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.script.write().unwrap().push_back(Err(error));
        self
    }

    /// Prompts received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.write().unwrap().push(prompt.to_string());

        match self.script.write().unwrap().pop_front() {
            Some(Ok(reply)) => {
                *self.last_reply.write().unwrap() = Some(reply.clone());
                Ok(reply)
            }
            Some(Err(e)) => Err(e),
            None => self
                .last_reply
                .read()
                .unwrap()
                .clone()
                .ok_or_else(|| GenerationError::Permanent("no scripted reply".into())),
        }
    }
}

/// A sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: RwLock<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.read().unwrap().clone()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.sleeps.read().unwrap().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.write().unwrap().push(duration);
    }
}

/// A local server that accepts connections and never answers.
///
/// Returns its `http://` base URL and a count of accepted connections.
/// Connections stay open until the runtime shuts down.
pub async fn silent_endpoint() -> std::io::Result<(String, Arc<AtomicUsize>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });

    Ok((format!("http://{}", addr), accepted))
}
