//! Enrichment pipeline.
//!
//! - [`PlotEnricher`] - per-record state machine and batch driver
//! - [`PlotMaintenance`] - clean and reset passes over stored records
//! - [`plot_queries`] - search phrasings for a movie

pub mod enricher;
pub mod maintenance;
pub mod queries;

pub use enricher::{CandidateSearch, PlotEnricher};
pub use maintenance::PlotMaintenance;
pub use queries::plot_queries;
