//! HTTP page fetcher.
//!
//! - URL policy check before any request
//! - browser-like identity headers
//! - connect and read timeouts
//! - certificate verification first; one unverified retry on a connection
//!   level failure, never on a timeout
//! - HTML content types only

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::security::UrlPolicy;
use crate::traits::{FetchedPage, PageFetcher};

/// Fetches article pages over HTTP.
pub struct HttpFetcher {
    verified: Client,
    unverified: Client,
    policy: UrlPolicy,
}

impl HttpFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> CrawlResult<Self> {
        Ok(Self {
            verified: build_client(config, false)?,
            unverified: build_client(config, true)?,
            policy: UrlPolicy::new().block_domains(config.blocked_hosts.iter().cloned()),
        })
    }

    /// Replace the URL policy.
    pub fn with_policy(mut self, policy: UrlPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch a URL, reporting why it failed.
    pub async fn try_fetch(&self, url: &str) -> CrawlResult<FetchedPage> {
        self.policy.validate(url)?;

        let response = match self.verified.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(CrawlError::Timeout {
                    url: url.to_string(),
                })
            }
            Err(e) if e.is_connect() => {
                debug!(url = %url, error = %e, "Connection failed, retrying without certificate verification");
                self.unverified
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| classify(url, e))?
            }
            Err(e) => return Err(classify(url, e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if !content_type.contains("text/html") {
            return Err(CrawlError::UnsupportedContentType {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| classify(url, e))?;

        Ok(FetchedPage {
            url: final_url,
            html,
            content_type,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        match self.try_fetch(url).await {
            Ok(page) => {
                debug!(url = %url, bytes = page.html.len(), "Fetched page");
                Some(page)
            }
            Err(CrawlError::Security(e)) => {
                debug!(url = %url, reason = %e, "Skipping URL");
                None
            }
            Err(e @ (CrawlError::Status { .. } | CrawlError::UnsupportedContentType { .. })) => {
                debug!(url = %url, error = %e, "Unusable response");
                None
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                None
            }
        }
    }
}

fn build_client(config: &FetchConfig, accept_invalid_certs: bool) -> CrawlResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| CrawlError::Http(Box::new(e)))
}

fn classify(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http(Box::new(error))
    }
}
