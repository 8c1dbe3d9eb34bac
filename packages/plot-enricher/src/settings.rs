//! Environment-backed settings for the command-line tool.

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use openai_client::OpenAIClient;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::EnricherConfig;
use crate::normalize::{OpenAIGenerator, TextNormalizer, DEFAULT_MODEL};
use crate::search::{
    NoopSearcher, RateLimitedSearcher, SerperSearcher, TavilySearcher, DEFAULT_SEARCH_TIMEOUT,
};
use crate::security::SecretString;
use crate::traits::{Sleeper, WebSearcher};

/// Which search API backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchProvider {
    #[default]
    Serper,
    Tavily,
}

impl FromStr for SearchProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serper" => Ok(Self::Serper),
            "tavily" => Ok(Self::Tavily),
            other => bail!("unknown SEARCH_PROVIDER '{}', expected serper or tavily", other),
        }
    }
}

/// Settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    pub movies_dir: PathBuf,
    pub search_provider: SearchProvider,
    pub serper_api_key: Option<SecretString>,
    pub tavily_api_key: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub search_requests_per_second: u32,
    pub search_timeout: Duration,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
        };

        Ok(Self {
            movies_dir: lookup("MOVIES_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| EnricherConfig::default().movies_dir),
            search_provider: lookup("SEARCH_PROVIDER")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
            serper_api_key: secret("SERPER_API_KEY"),
            tavily_api_key: secret("TAVILY_API_KEY"),
            openai_api_key: secret("OPENAI_API_KEY"),
            openai_model: lookup("OPENAI_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            search_requests_per_second: lookup("SEARCH_REQUESTS_PER_SECOND")
                .map(|v| v.trim().parse())
                .transpose()
                .context("SEARCH_REQUESTS_PER_SECOND must be a positive integer")?
                .unwrap_or(1),
            search_timeout: lookup("SEARCH_TIMEOUT_SECS")
                .map(|v| v.trim().parse().map(Duration::from_secs))
                .transpose()
                .context("SEARCH_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_SEARCH_TIMEOUT),
        })
    }

    /// Override the records directory.
    pub fn with_movies_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.movies_dir = dir.into();
        self
    }

    /// Override the key of the selected search provider.
    pub fn with_search_key(mut self, key: impl Into<SecretString>) -> Self {
        match self.search_provider {
            SearchProvider::Serper => self.serper_api_key = Some(key.into()),
            SearchProvider::Tavily => self.tavily_api_key = Some(key.into()),
        }
        self
    }

    /// Key for the selected search provider, if any.
    pub fn search_key(&self) -> Option<&SecretString> {
        match self.search_provider {
            SearchProvider::Serper => self.serper_api_key.as_ref(),
            SearchProvider::Tavily => self.tavily_api_key.as_ref(),
        }
    }

    /// Build the rate-limited searcher for the selected provider.
    ///
    /// Without a key the pipeline still runs, but every search comes back
    /// empty.
    pub fn searcher(&self) -> Result<Arc<dyn WebSearcher>> {
        let rps = self.search_requests_per_second;
        let searcher: Arc<dyn WebSearcher> = match (self.search_provider, self.search_key().cloned())
        {
            (SearchProvider::Serper, Some(key)) => {
                let inner = SerperSearcher::new(key)
                    .and_then(|s| s.with_timeout(self.search_timeout))
                    .context("Failed to build Serper client")?;
                Arc::new(RateLimitedSearcher::new(inner, rps))
            }
            (SearchProvider::Tavily, Some(key)) => {
                let inner = TavilySearcher::new(key)
                    .and_then(|s| s.with_timeout(self.search_timeout))
                    .context("Failed to build Tavily client")?;
                Arc::new(RateLimitedSearcher::new(inner, rps))
            }
            (provider, None) => {
                warn!(provider = ?provider, "No search API key configured, searches will find nothing");
                Arc::new(NoopSearcher)
            }
        };
        Ok(searcher)
    }

    /// Build the normalizer, or `None` when no generation key is configured.
    pub fn normalizer(&self, sleeper: Arc<dyn Sleeper>) -> Result<Option<TextNormalizer>> {
        let Some(key) = &self.openai_api_key else {
            info!("OPENAI_API_KEY not set, normalization disabled");
            return Ok(None);
        };

        let client = OpenAIClient::new(key.expose())
            .with_timeout(Duration::from_secs(60))
            .context("Failed to build OpenAI client")?;
        let generator = OpenAIGenerator::new(client).with_model(&self.openai_model);

        Ok(Some(TextNormalizer::new(Arc::new(generator), sleeper)))
    }

    /// Enricher configuration rooted at the configured directory.
    pub fn enricher_config(&self) -> EnricherConfig {
        EnricherConfig::default().with_movies_dir(&self.movies_dir)
    }
}
