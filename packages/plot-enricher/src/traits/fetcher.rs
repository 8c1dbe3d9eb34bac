//! Page fetcher trait.
//!
//! A fetcher turns a URL into an HTML document or nothing. Every failure
//! mode (policy rejection, transport error, timeout, non-HTML body) is
//! collapsed into `None` at this boundary.

use async_trait::async_trait;

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL the document was fetched from.
    pub url: String,

    /// Raw response body.
    pub html: String,

    /// `Content-Type` header value.
    pub content_type: String,
}

impl FetchedPage {
    /// Create a page with an HTML content type.
    pub fn html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            content_type: "text/html; charset=utf-8".to_string(),
        }
    }
}

/// Retrieves HTML documents.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL, returning `None` on any failure.
    async fn fetch(&self, url: &str) -> Option<FetchedPage>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        (**self).fetch(url).await
    }
}
