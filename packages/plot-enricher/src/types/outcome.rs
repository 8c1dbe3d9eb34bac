//! Per-record outcomes and run summaries.

use serde::Serialize;
use std::fmt;

use super::record::PlotSource;

/// Pipeline stage at which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStage {
    /// Reading or parsing the record file.
    Loading,
    Searching,
    Extracting,
    Normalizing,
    /// Writing the enriched record back.
    Saving,
}

/// Why a record was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A valid enriched plot is already stored.
    Existing,
    /// The catalog plot is already long enough.
    Adequate,
}

/// Why a record could not be enriched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureReason {
    /// No candidate passed validation across every query.
    NoValidPlot,
    /// A candidate was accepted but neither it nor its normalization was long enough.
    NoSuitablePlot,
    /// Missing identifying fields or unreadable JSON.
    MalformedRecord(String),
    /// Reading or writing the record file failed.
    Storage(String),
    /// Processing panicked.
    Panicked(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoValidPlot => f.write_str("no valid plot"),
            Self::NoSuitablePlot => f.write_str("no suitable plot"),
            Self::MalformedRecord(detail) => write!(f, "malformed record: {}", detail),
            Self::Storage(detail) => write!(f, "storage error: {}", detail),
            Self::Panicked(detail) => write!(f, "panicked: {}", detail),
        }
    }
}

/// Result of running one record through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum EnrichmentOutcome {
    Updated {
        source: PlotSource,
        length: usize,
        url: String,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        /// `None` when processing panicked and the stage is unknown.
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<EnrichmentStage>,
        reason: FailureReason,
    },
}

impl EnrichmentOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    pub fn failed(stage: EnrichmentStage, reason: FailureReason) -> Self {
        Self::Failed {
            stage: Some(stage),
            reason,
        }
    }

    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Failed {
            stage: None,
            reason: FailureReason::Panicked(message.into()),
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Tally of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &EnrichmentOutcome) {
        self.total += 1;
        match outcome {
            EnrichmentOutcome::Updated { .. } => self.updated += 1,
            EnrichmentOutcome::Skipped { .. } => self.skipped += 1,
            EnrichmentOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Updated: {}, Skipped: {}, Failed: {} (of {})",
            self.updated, self.skipped, self.failed, self.total
        )
    }
}

/// Tally of a maintenance or reset pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceSummary {
    pub scanned: usize,
    pub cleaned: usize,
    pub errors: usize,
    /// File names that were (or, on a dry run, would be) cleaned.
    pub cleaned_files: Vec<String>,
    pub dry_run: bool,
}
