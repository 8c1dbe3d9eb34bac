//! Capability traits for the enrichment pipeline.
//!
//! Each external dependency of the orchestrator is a trait so the whole
//! pipeline can run against mocks:
//! - [`WebSearcher`] - keyword search
//! - [`PageFetcher`] - HTML retrieval
//! - [`TextGenerator`] - generative normalization
//! - [`Sleeper`] - pacing and backoff delays

pub mod fetcher;
pub mod generator;
pub mod searcher;
pub mod sleeper;

pub use fetcher::{FetchedPage, PageFetcher};
pub use generator::TextGenerator;
pub use searcher::{SearchResult, WebSearcher};
pub use sleeper::{Sleeper, TokioSleeper};
