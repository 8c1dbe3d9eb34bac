//! Maintenance passes over stored records.
//!
//! - `clean`: blank enriched plots that no longer validate, making those
//!   records eligible for re-enrichment
//! - `reset`: strip all enrichment fields from every record

use tracing::{error, info};

use crate::config::LengthThresholds;
use crate::error::Result;
use crate::store::MovieStore;
use crate::types::{MaintenanceSummary, MovieRecord};
use crate::validation::ContentValidator;

/// Runs clean and reset passes over a store.
#[derive(Debug, Clone)]
pub struct PlotMaintenance {
    store: MovieStore,
    validator: ContentValidator,
}

impl PlotMaintenance {
    pub fn new(store: MovieStore, thresholds: LengthThresholds) -> Self {
        Self {
            store,
            validator: ContentValidator::new(thresholds),
        }
    }

    /// Blank enriched plots that fail re-validation.
    ///
    /// The raw source text is kept for auditing. With `dry_run` nothing is
    /// written and the summary lists what would be cleaned.
    pub async fn clean(&self, dry_run: bool) -> Result<MaintenanceSummary> {
        let validator = self.validator;
        self.sweep(dry_run, "Cleaning invalid plot", move |record| {
            let invalid = record
                .web_plot
                .as_deref()
                .is_some_and(|plot| !validator.is_valid(plot, true));
            if invalid {
                record.clear_web_plot();
                record.last_updated = Some(chrono::Local::now().format("%Y-%m-%d").to_string());
            }
            invalid
        })
        .await
    }

    /// Remove `web_plot`, `raw_web_plot` and `plot_source` everywhere.
    pub async fn reset(&self, dry_run: bool) -> Result<MaintenanceSummary> {
        self.sweep(dry_run, "Removing enrichment fields", |record| {
            let had = record.has_enrichment();
            record.clear_enrichment();
            had
        })
        .await
    }

    /// Apply `change` to every record, saving those it reports as changed.
    async fn sweep(
        &self,
        dry_run: bool,
        action: &str,
        change: impl Fn(&mut MovieRecord) -> bool,
    ) -> Result<MaintenanceSummary> {
        let paths = self.store.list().await?;
        let mut summary = MaintenanceSummary {
            dry_run,
            ..Default::default()
        };

        for path in &paths {
            summary.scanned += 1;

            let mut record = match self.store.load(path).await {
                Ok(record) => record,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Error reading record");
                    summary.errors += 1;
                    continue;
                }
            };

            if !change(&mut record) {
                continue;
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!(record = %name, title = ?record.title(), dry_run, "{}", action);

            if !dry_run {
                if let Err(e) = self.store.save(path, &record).await {
                    error!(path = %path.display(), error = %e, "Error writing record");
                    summary.errors += 1;
                    continue;
                }
            }

            summary.cleaned += 1;
            summary.cleaned_files.push(name);
        }

        info!(
            scanned = summary.scanned,
            cleaned = summary.cleaned,
            errors = summary.errors,
            dry_run,
            "Maintenance pass completed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlotSource;
    use tempfile::TempDir;

    const COOKIE_NOTICE: &str = "We use cookies to give you the best experience on our site. \
        By continuing to browse you accept cookies as described in our cookie policy. \
        Manage your consent preferences at any time.";

    async fn store_with(records: &[MovieRecord]) -> (TempDir, MovieStore) {
        let dir = TempDir::new().unwrap();
        let store = MovieStore::new(dir.path());
        for record in records {
            store.insert(record).await.unwrap();
        }
        (dir, store)
    }

    #[tokio::test]
    async fn test_clean_dry_run_writes_nothing() {
        let record = MovieRecord::new("Noise Film", "2020")
            .with_web_plot(COOKIE_NOTICE, PlotSource::RawFetched);
        let (dir, store) = store_with(&[record]).await;
        let path = dir.path().join("Noise-Film-2020.json");
        let before = std::fs::read_to_string(&path).unwrap();

        let summary = PlotMaintenance::new(store, LengthThresholds::default())
            .clean(true)
            .await
            .unwrap();

        assert_eq!(summary.cleaned, 1);
        assert!(summary.dry_run);
        assert_eq!(summary.cleaned_files, vec!["Noise-Film-2020.json"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_reset_strips_all_enrichment() {
        let mut enriched = MovieRecord::new("Test Film", "2020")
            .with_web_plot("Some plot.", PlotSource::GenerationCleaned);
        enriched.raw_web_plot = Some("Raw text.".into());
        let plain = MovieRecord::new("Plain Film", "2021");
        let (_dir, store) = store_with(&[enriched, plain]).await;

        let summary = PlotMaintenance::new(store.clone(), LengthThresholds::default())
            .reset(false)
            .await
            .unwrap();

        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.cleaned, 1);

        let path = store.resolve("Test-Film-2020").await.unwrap();
        let record = store.load(&path).await.unwrap();
        assert!(!record.has_enrichment());
    }

    #[tokio::test]
    async fn test_unreadable_record_counts_as_error() {
        let (dir, store) = store_with(&[]).await;
        std::fs::write(dir.path().join("Broken-2020.json"), "{oops").unwrap();

        let summary = PlotMaintenance::new(store, LengthThresholds::default())
            .clean(false)
            .await
            .unwrap();
        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.errors, 1);
    }
}
