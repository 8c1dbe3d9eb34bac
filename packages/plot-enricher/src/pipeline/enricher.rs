//! The plot enrichment orchestrator.
//!
//! Per record: eligibility check, then search, fetch and extract until the
//! first acceptable candidate, then optional normalization, then commit.
//! Records are processed strictly one after another.

use futures::FutureExt;
use rand::Rng;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::EnricherConfig;
use crate::error::{EnrichError, Result};
use crate::extract::PageExtractor;
use crate::normalize::TextNormalizer;
use crate::security::{url_matches_any, NON_ARTICLE_HOSTS, STOREFRONT_HOSTS};
use crate::store::MovieStore;
use crate::traits::{PageFetcher, Sleeper, WebSearcher};
use crate::types::{
    BatchSummary, CandidatePassage, EnrichmentOutcome, EnrichmentStage, FailureReason,
    MovieRecord, PlotSource, SkipReason,
};
use crate::validation::{char_len, ContentValidator};

use super::queries::plot_queries;

/// Result of the search-and-extract loop.
#[derive(Debug)]
pub struct CandidateSearch {
    pub candidate: Option<CandidatePassage>,
    /// Whether any query returned at least one result.
    pub had_results: bool,
}

/// Drives records through search, extraction, normalization and commit.
pub struct PlotEnricher {
    config: EnricherConfig,
    store: MovieStore,
    validator: ContentValidator,
    extractor: PageExtractor,
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
    normalizer: Option<TextNormalizer>,
    sleeper: Arc<dyn Sleeper>,
}

impl PlotEnricher {
    /// Create an enricher without normalization.
    pub fn new(
        config: EnricherConfig,
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            store: MovieStore::new(&config.movies_dir),
            validator: ContentValidator::new(config.thresholds),
            extractor: PageExtractor::new(&config),
            config,
            searcher,
            fetcher,
            normalizer: None,
            sleeper,
        }
    }

    /// Attach a normalizer. It is used only while `config.normalize` is set.
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = Some(normalizer.with_min_chars(self.config.thresholds.normalized_min));
        self
    }

    pub fn config(&self) -> &EnricherConfig {
        &self.config
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    // =========================================================================
    // Batch and single-record entry points
    // =========================================================================

    /// Process every record in the store.
    ///
    /// Fails only when the directory is missing or holds no records. Every
    /// per-record error, including a panic, is logged and counted as failed.
    pub async fn run_all(&self) -> Result<BatchSummary> {
        let paths = self.store.list().await?;
        if paths.is_empty() {
            return Err(EnrichError::NoRecords(self.store.dir().to_path_buf()));
        }

        info!(count = paths.len(), "Found movie records to process");
        let mut summary = BatchSummary::default();

        for (i, path) in paths.iter().enumerate() {
            let name = display_name(path);
            info!(record = %name, "Processing {}/{}", i + 1, paths.len());

            let outcome = self.process_guarded(path).await;
            log_outcome(&name, &outcome);
            summary.record(&outcome);

            if i + 1 < paths.len() {
                self.sleeper.sleep(self.record_delay()).await;
            }
        }

        info!(
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Processing completed"
        );
        Ok(summary)
    }

    /// Process one record named by path, file name or stem.
    pub async fn run_one(&self, name: &str) -> Result<EnrichmentOutcome> {
        let path = self.store.resolve(name).await?;
        let outcome = self.enrich_file(&path).await?;
        log_outcome(&display_name(&path), &outcome);
        Ok(outcome)
    }

    /// Process one file, converting errors and panics into a failed outcome.
    async fn process_guarded(&self, path: &Path) -> EnrichmentOutcome {
        match AssertUnwindSafe(self.enrich_staged(path)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err((stage, e))) => {
                if is_malformed(&e) {
                    warn!(path = %path.display(), error = %e, "Skipping malformed record");
                } else {
                    error!(path = %path.display(), stage = ?stage, error = %e, "Failed to process record");
                }
                EnrichmentOutcome::failed(stage, failure_for(&e))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(path = %path.display(), panic = %message, "Record processing panicked");
                EnrichmentOutcome::panicked(message)
            }
        }
    }

    /// Load, enrich and, on update, rewrite one record file.
    pub async fn enrich_file(&self, path: &Path) -> Result<EnrichmentOutcome> {
        self.enrich_staged(path).await.map_err(|(_, e)| e)
    }

    /// Like [`Self::enrich_file`], tagging an error with the stage it came from.
    async fn enrich_staged(
        &self,
        path: &Path,
    ) -> std::result::Result<EnrichmentOutcome, (EnrichmentStage, EnrichError)> {
        let mut record = self
            .store
            .load(path)
            .await
            .map_err(|e| (EnrichmentStage::Loading, e))?;

        if record.title().is_none() {
            return Err((
                EnrichmentStage::Loading,
                EnrichError::MalformedRecord {
                    path: path.to_path_buf(),
                    reason: "no title".into(),
                },
            ));
        }

        let outcome = self.enrich_record(&mut record).await;
        if outcome.is_updated() {
            self.store
                .save(path, &record)
                .await
                .map_err(|e| (EnrichmentStage::Saving, e))?;
        }
        Ok(outcome)
    }

    // =========================================================================
    // Per-record state machine
    // =========================================================================

    /// Run one record through the pipeline in memory.
    ///
    /// The record is modified only when the outcome is `Updated`, apart from
    /// clearing an enriched plot that no longer validates.
    pub async fn enrich_record(&self, record: &mut MovieRecord) -> EnrichmentOutcome {
        let Some(title) = record.title().map(str::to_string) else {
            return EnrichmentOutcome::failed(
                EnrichmentStage::Loading,
                FailureReason::MalformedRecord("no title".into()),
            );
        };

        if let Some(reason) = self.eligibility(record) {
            info!(title = %title, reason = ?reason, "Skipping record");
            return EnrichmentOutcome::skipped(reason);
        }

        let year = record.year_text();
        let search = self.find_candidate(&title, &year).await;
        let Some(candidate) = search.candidate else {
            warn!(title = %title, year = %year, "Could not find a valid plot");
            let stage = if search.had_results {
                EnrichmentStage::Extracting
            } else {
                EnrichmentStage::Searching
            };
            return EnrichmentOutcome::failed(stage, FailureReason::NoValidPlot);
        };

        let base_plot = record.base_plot().to_string();
        let (text, source) = match self.normalized(&candidate, &title, &year, &base_plot).await {
            Some(clean) => (clean, PlotSource::GenerationCleaned),
            None if candidate.len() >= self.config.thresholds.strict_min => {
                (candidate.text.clone(), PlotSource::RawFetched)
            }
            None => {
                warn!(title = %title, chars = candidate.len(), "No suitable plot after normalization");
                return EnrichmentOutcome::failed(
                    EnrichmentStage::Normalizing,
                    FailureReason::NoSuitablePlot,
                );
            }
        };

        let length = char_len(&text);
        record.raw_web_plot = match source {
            PlotSource::GenerationCleaned => Some(candidate.text.clone()),
            PlotSource::RawFetched => None,
        };
        record.web_plot = Some(text);
        record.plot_source = Some(source);
        record.last_updated = Some(today());

        EnrichmentOutcome::Updated {
            source,
            length,
            url: candidate.source_url,
        }
    }

    /// Decide whether a record needs enrichment.
    ///
    /// Clears a stored enriched plot that no longer validates.
    pub fn eligibility(&self, record: &mut MovieRecord) -> Option<SkipReason> {
        if let Some(web_plot) = record.web_plot.as_deref() {
            if self.validator.is_valid(web_plot, true) {
                if char_len(web_plot.trim()) >= self.existing_floor(record.plot_source) {
                    return Some(SkipReason::Existing);
                }
            } else {
                info!(title = ?record.title(), "Existing web plot is invalid, will re-enhance");
                record.clear_web_plot();
            }
        }

        if char_len(record.base_plot().trim()) >= self.config.thresholds.adequate_base_plot {
            return Some(SkipReason::Adequate);
        }

        None
    }

    /// Length a stored plot needs to count as already enriched.
    fn existing_floor(&self, source: Option<PlotSource>) -> usize {
        match source {
            Some(PlotSource::GenerationCleaned) => self.config.thresholds.normalized_min,
            _ => self.config.thresholds.strict_min,
        }
    }

    /// Search each query phrasing in order; first acceptable candidate wins.
    pub async fn find_candidate(&self, title: &str, year: &str) -> CandidateSearch {
        let queries = plot_queries(title, year);
        let mut had_results = false;

        for (i, query) in queries.iter().enumerate() {
            let results = self
                .searcher
                .search_with_limit(query, self.config.max_results_per_query)
                .await;
            debug!(query = %query, results = results.len(), provider = self.searcher.name(), "Search returned");
            had_results |= !results.is_empty();

            for result in &results {
                let url = result.url.as_str();
                if is_skipped_host(url) {
                    debug!(url = %url, "Skipping non-article host");
                    continue;
                }

                let Some(page) = self.fetcher.fetch(url).await else {
                    continue;
                };
                let Some(candidate) = self.extractor.extract(&page.html, url) else {
                    continue;
                };

                if self.accepts(&candidate) {
                    info!(title = %title, url = %url, chars = candidate.len(), preferred = candidate.preferred, "Found plot");
                    return CandidateSearch {
                        candidate: Some(candidate),
                        had_results,
                    };
                }
                debug!(url = %url, chars = candidate.len(), "Candidate below length floor");
            }

            if i + 1 < queries.len() {
                self.sleeper.sleep(self.config.query_pause).await;
            }
        }

        CandidateSearch {
            candidate: None,
            had_results,
        }
    }

    /// Strict floor for any source, relaxed floor for preferred sources.
    fn accepts(&self, candidate: &CandidatePassage) -> bool {
        let length = candidate.len();
        length >= self.config.thresholds.strict_min
            || (candidate.preferred && length >= self.config.thresholds.preferred_min)
    }

    /// Normalize a candidate when a normalizer is configured and enabled.
    ///
    /// The synopsis must itself validate, so a stored plot always survives
    /// re-validation.
    async fn normalized(
        &self,
        candidate: &CandidatePassage,
        title: &str,
        year: &str,
        base_plot: &str,
    ) -> Option<String> {
        if !self.config.normalize {
            return None;
        }
        let normalizer = self.normalizer.as_ref()?;

        let clean = normalizer
            .normalize(&candidate.text, title, year, base_plot)
            .await?;

        if !self.validator.is_valid(&clean, true) {
            warn!(title = %title, "Normalized synopsis failed validation, keeping raw text");
            return None;
        }
        Some(clean)
    }

    /// Uniform politeness delay between records.
    fn record_delay(&self) -> Duration {
        let min = self.config.record_delay_min.as_millis() as u64;
        let max = self.config.record_delay_max.as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

fn is_skipped_host(url: &str) -> bool {
    url_matches_any(url, STOREFRONT_HOSTS) || url_matches_any(url, NON_ARTICLE_HOSTS)
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_malformed(error: &EnrichError) -> bool {
    matches!(
        error,
        EnrichError::MalformedRecord { .. } | EnrichError::Json { .. }
    )
}

fn failure_for(error: &EnrichError) -> FailureReason {
    match error {
        EnrichError::MalformedRecord { reason, .. } => FailureReason::MalformedRecord(reason.clone()),
        EnrichError::Json { source, .. } => FailureReason::MalformedRecord(source.to_string()),
        other => FailureReason::Storage(other.to_string()),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_outcome(name: &str, outcome: &EnrichmentOutcome) {
    match outcome {
        EnrichmentOutcome::Updated { source, length, url } => {
            info!(record = %name, source = %source, chars = length, url = %url, "Enhanced plot")
        }
        EnrichmentOutcome::Skipped { reason } => {
            info!(record = %name, reason = ?reason, "Skipped")
        }
        EnrichmentOutcome::Failed {
            reason: reason @ (FailureReason::NoValidPlot | FailureReason::NoSuitablePlot),
            ..
        } => info!(record = %name, reason = %reason, "No suitable plot found"),
        EnrichmentOutcome::Failed {
            stage,
            reason: reason @ FailureReason::MalformedRecord(_),
        } => warn!(record = %name, stage = ?stage, reason = %reason, "Skipped malformed record"),
        EnrichmentOutcome::Failed { stage, reason } => {
            error!(record = %name, stage = ?stage, reason = %reason, "Failed to process")
        }
    }
}
