//! Typed errors for the plot enrichment library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Transient external
//! failures are converted to empty results at the component boundary, so most
//! of these only surface in logs; the orchestrator sees `EnrichError` only for
//! storage and record-shape problems.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while enriching or maintaining movie records.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Search or fetch failed
    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// Generation service failed
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Reading or writing a record file failed
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record is missing identifying fields
    #[error("malformed record {}: {reason}", path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    /// JSON (de)serialization failed
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Storage directory does not exist
    #[error("movies directory not found: {}", .0.display())]
    StorageDirMissing(PathBuf),

    /// Storage directory holds no records
    #[error("no movie records found in {}", .0.display())]
    NoRecords(PathBuf),

    /// Named record could not be resolved to a file
    #[error("record not found: {0}")]
    RecordNotFound(String),
}

impl EnrichError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur during search and fetch operations.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// URL policy rejected the request
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Connect or read timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response is not an HTML document
    #[error("unsupported content type {content_type:?} for {url}")]
    UnsupportedContentType { url: String, content_type: String },

    /// Search API rejected or failed the query
    #[error("{provider} search API error: {status}")]
    SearchApi { provider: &'static str, status: u16 },
}

/// URL policy errors, primarily for SSRF protection and host denylisting.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is denylisted (social networks, storefronts, localhost)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Errors from the text generation capability.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Worth retrying (network, rate limit, server error)
    #[error("transient generation failure: {0}")]
    Transient(String),

    /// Retrying will not help (auth, bad request, parse)
    #[error("generation failed: {0}")]
    Permanent(String),
}

impl GenerationError {
    /// Whether the retry policy should try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<openai_client::OpenAIError> for GenerationError {
    fn from(err: openai_client::OpenAIError) -> Self {
        if err.is_transient() {
            Self::Transient(err.to_string())
        } else {
            Self::Permanent(err.to_string())
        }
    }
}

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
