//! Data types for movie records and pipeline results.

pub mod candidate;
pub mod outcome;
pub mod record;

pub use candidate::CandidatePassage;
pub use outcome::{
    BatchSummary, EnrichmentOutcome, EnrichmentStage, FailureReason, MaintenanceSummary,
    SkipReason,
};
pub use record::{MovieRecord, PlotSource, Year};
