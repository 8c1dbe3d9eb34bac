//! Web Plot Enrichment Library
//!
//! Takes a directory of per-movie JSON records and, for each record whose
//! plot is missing or thin, searches the web, fetches candidate pages,
//! extracts narrative text, rejects noise (block pages, cookie banners,
//! templates), optionally rewrites the passage into a clean synopsis, and
//! writes the result back with provenance.
//!
//! # Usage
//!
//! ```rust,ignore
//! use plot_enricher::{EnricherConfig, FetchConfig, HttpFetcher, PlotEnricher, TokioSleeper};
//! use plot_enricher::search::SerperSearcher;
//! use std::sync::Arc;
//!
//! let enricher = PlotEnricher::new(
//!     EnricherConfig::default().with_movies_dir("data/movies"),
//!     Arc::new(SerperSearcher::new(api_key)?),
//!     Arc::new(HttpFetcher::new(&FetchConfig::default())?),
//!     Arc::new(TokioSleeper),
//! );
//!
//! let summary = enricher.run_all().await?;
//! println!("{}", summary);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability abstractions (WebSearcher, PageFetcher, TextGenerator, Sleeper)
//! - [`types`] - Movie records, candidate passages and outcomes
//! - [`validation`] - Heuristic plot-text validator
//! - [`extract`] - HTML plot-section extraction
//! - [`fetch`] - HTTP page fetching
//! - [`search`] - Search providers
//! - [`normalize`] - Generative synopsis normalization
//! - [`pipeline`] - Per-record orchestration, batch driver and maintenance
//! - [`store`] - File-per-movie JSON storage
//! - [`security`] - Credential handling and URL policy
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod retry;
pub mod search;
pub mod security;
pub mod settings;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export core types at crate root
pub use config::{EnricherConfig, FetchConfig, LengthThresholds};
pub use error::{CrawlError, EnrichError, GenerationError, SecurityError};
pub use extract::PageExtractor;
pub use fetch::HttpFetcher;
pub use normalize::{OpenAIGenerator, TextNormalizer};
pub use pipeline::{PlotEnricher, PlotMaintenance};
pub use retry::RetryPolicy;
pub use settings::{SearchProvider, Settings};
pub use store::MovieStore;
pub use traits::{
    FetchedPage, PageFetcher, SearchResult, Sleeper, TextGenerator, TokioSleeper, WebSearcher,
};
pub use types::{
    BatchSummary, CandidatePassage, EnrichmentOutcome, EnrichmentStage, FailureReason,
    MaintenanceSummary, MovieRecord, PlotSource, SkipReason, Year,
};
pub use validation::{ContentValidator, RejectReason, Verdict};
