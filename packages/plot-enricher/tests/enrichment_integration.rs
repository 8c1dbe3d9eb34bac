//! End-to-end tests for the enrichment pipeline against mock capabilities.

use plot_enricher::testing::{MockFetcher, MockGenerator, MockWebSearcher, RecordingSleeper};
use plot_enricher::{
    EnrichError, EnricherConfig, EnrichmentOutcome, EnrichmentStage, FailureReason, FetchedPage,
    MovieRecord, MovieStore, PageFetcher, PlotEnricher, PlotMaintenance, PlotSource, SkipReason,
    TextNormalizer,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WIKI_URL: &str = "https://en.wikipedia.org/wiki/Test_Film";

const WIKI_PARA_1: &str = "The film opens in a quiet mountain village where a retired police \
officer recruits two small-time thieves to capture a ruthless bandit who has terrorised the \
valley for years.";

const WIKI_PARA_2: &str = "Over the course of the story the pair grow loyal to the officer and \
to the villagers they were hired to protect. A romance blossoms between one thief and a spirited \
cart driver, while the other befriends a widow living in the officer's house. The final \
confrontation at the quarry tests every character.";

const SHORT_PARA_1: &str = "The movie follows a young farmer who leaves his drought stricken \
village for the city to earn money for his ailing mother.";

const SHORT_PARA_2: &str = "He finds work on a construction site, befriends an old watchman, and \
slowly learns the city's harsh rules. When the site owner cheats the workers, he must choose \
between loyalty and survival.";

const SYNOPSIS: &str = "The movie tells the story of Ravi, a young farmer who leaves his drought \
stricken village for the city to earn money for his ailing mother. He takes a job on a \
construction site, where an old watchman named Bashir becomes his friend and teaches him how the \
city works. Ravi sends every rupee home and sleeps on the site at night. When the owner of the \
site cheats the workers out of their wages, Ravi must decide whether to stay silent or lead the \
others in a protest. The film ends with Ravi returning home, poorer but wiser.";

const COOKIE_BANNER: &str = "We use cookies to improve your experience on this site. By \
continuing to browse you accept cookies as described in our cookie policy. You can manage \
consent in your privacy settings at any time.";

// ============================================================================
// Fixtures
// ============================================================================

fn wiki_page() -> String {
    format!(
        r#"<html><body>
<div class="mw-heading mw-heading2"><h2 id="Plot">Plot</h2></div>
<p>{}</p>
<p>{}</p>
<div class="mw-heading mw-heading2"><h2 id="Cast">Cast</h2></div>
<p>A long list of actors and the characters they play in the film, with notes on casting.</p>
</body></html>"#,
        WIKI_PARA_1.replace("bandit ", "bandit[1] "),
        WIKI_PARA_2
    )
}

fn wiki_text() -> String {
    format!("{} {}", WIKI_PARA_1, WIKI_PARA_2)
}

fn article_page(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>\n", p)).collect();
    format!("<html><body><nav>Menu</nav>\n{}</body></html>", body)
}

fn short_text() -> String {
    format!("{} {}", SHORT_PARA_1, SHORT_PARA_2)
}

fn write_record(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

fn test_film(dir: &Path) -> PathBuf {
    write_record(
        dir,
        "Test-Film-2020.json",
        r#"{"title": "Test Film", "year": 2020, "plot": "A short plot.", "rating": 7.5}"#,
    )
}

struct Harness {
    searcher: Arc<MockWebSearcher>,
    fetcher: Arc<MockFetcher>,
    sleeper: Arc<RecordingSleeper>,
    enricher: PlotEnricher,
}

fn harness(
    dir: &Path,
    searcher: MockWebSearcher,
    fetcher: MockFetcher,
    generator: Option<MockGenerator>,
) -> Harness {
    let searcher = Arc::new(searcher);
    let fetcher = Arc::new(fetcher);
    let sleeper = Arc::new(RecordingSleeper::new());

    let config = EnricherConfig::default()
        .with_movies_dir(dir)
        .with_normalize(generator.is_some());
    let mut enricher = PlotEnricher::new(config, searcher.clone(), fetcher.clone(), sleeper.clone());
    if let Some(generator) = generator {
        enricher = enricher.with_normalizer(TextNormalizer::new(Arc::new(generator), sleeper.clone()));
    }

    Harness {
        searcher,
        fetcher,
        sleeper,
        enricher,
    }
}

fn load(path: &Path) -> MovieRecord {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_encyclopedia_plot_is_stored_verbatim() {
    let dir = TempDir::new().unwrap();
    let path = test_film(dir.path());

    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_urls("Test Film 2020 plot summary wikipedia", &[WIKI_URL]),
        MockFetcher::new().with_page(WIKI_URL, wiki_page()),
        None,
    );

    let summary = h.enricher.run_all().await.unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.total, 1);

    let record = load(&path);
    let expected = wiki_text();
    assert!(expected.chars().count() >= 400);
    assert_eq!(record.web_plot.as_deref(), Some(expected.as_str()));
    assert_eq!(record.plot_source, Some(PlotSource::RawFetched));
    assert!(record.raw_web_plot.is_none());
    assert!(record.last_updated.is_some());
    assert_eq!(record.plot.as_deref(), Some("A short plot."));
    assert_eq!(record.extra.get("rating"), Some(&serde_json::json!(7.5)));

    // First query succeeded, so no pause between phrasings.
    assert_eq!(h.searcher.calls().len(), 1);
    assert!(h.sleeper.sleeps().is_empty());

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"plot_source\": \"web_scraped\""));
}

#[tokio::test]
async fn test_noise_pages_leave_record_untouched() {
    let dir = TempDir::new().unwrap();
    let path = test_film(dir.path());
    let before = std::fs::read(&path).unwrap();

    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[
            "https://www.imdb.com/title/tt0000001/",
            "https://cookies.example.com/test-film",
        ]),
        MockFetcher::new().with_page(
            "https://cookies.example.com/test-film",
            article_page(&[COOKIE_BANNER]),
        ),
        None,
    );

    let outcome = h.enricher.run_one("Test-Film-2020").await.unwrap();
    assert_eq!(
        outcome,
        EnrichmentOutcome::failed(EnrichmentStage::Extracting, FailureReason::NoValidPlot)
    );

    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(h.searcher.calls().len(), 3);
    assert!(h.fetcher.calls().iter().all(|u| !u.contains("imdb.com")));
    assert_eq!(h.fetcher.calls().len(), 3);
    assert_eq!(
        h.sleeper.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_short_text_rejected_from_ordinary_source() {
    let dir = TempDir::new().unwrap();
    let path = test_film(dir.path());
    let before = std::fs::read(&path).unwrap();

    let url = "https://filmreviews.example.org/test-film";
    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[url]),
        MockFetcher::new().with_page(url, article_page(&[SHORT_PARA_1, SHORT_PARA_2])),
        Some(MockGenerator::new().with_reply(SYNOPSIS)),
    );

    let length = short_text().chars().count();
    assert!((300..400).contains(&length));

    let outcome = h.enricher.run_one("Test-Film-2020.json").await.unwrap();
    assert!(matches!(
        outcome,
        EnrichmentOutcome::Failed {
            reason: FailureReason::NoValidPlot,
            ..
        }
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_short_text_from_preferred_source_is_normalized() {
    let dir = TempDir::new().unwrap();
    let path = test_film(dir.path());

    let url = "https://www.britannica.com/topic/Test-Film";
    let generator = MockGenerator::new().with_reply(SYNOPSIS);
    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[url]),
        MockFetcher::new().with_page(url, article_page(&[SHORT_PARA_1, SHORT_PARA_2])),
        Some(generator),
    );

    let outcome = h.enricher.run_one("Test-Film-2020").await.unwrap();
    assert_eq!(
        outcome,
        EnrichmentOutcome::Updated {
            source: PlotSource::GenerationCleaned,
            length: SYNOPSIS.chars().count(),
            url: url.to_string(),
        }
    );

    let record = load(&path);
    assert_eq!(record.web_plot.as_deref(), Some(SYNOPSIS));
    assert_eq!(record.raw_web_plot, Some(short_text()));
    assert_eq!(record.plot_source, Some(PlotSource::GenerationCleaned));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"plot_source\": \"web_scraped_ai_cleaned\""));
}

#[tokio::test]
async fn test_short_preferred_text_without_normalizer_is_not_stored() {
    let dir = TempDir::new().unwrap();
    let path = test_film(dir.path());
    let before = std::fs::read(&path).unwrap();

    let url = "https://www.britannica.com/topic/Test-Film";
    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[url]),
        MockFetcher::new().with_page(url, article_page(&[SHORT_PARA_1, SHORT_PARA_2])),
        None,
    );

    let outcome = h.enricher.run_one("Test-Film-2020").await.unwrap();
    assert_eq!(
        outcome,
        EnrichmentOutcome::failed(EnrichmentStage::Normalizing, FailureReason::NoSuitablePlot)
    );
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = test_film(dir.path());

    let first = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[WIKI_URL]),
        MockFetcher::new().with_page(WIKI_URL, wiki_page()),
        None,
    );
    assert_eq!(first.enricher.run_all().await.unwrap().updated, 1);
    let after_first = std::fs::read(&path).unwrap();

    let second = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[WIKI_URL]),
        MockFetcher::new().with_page(WIKI_URL, wiki_page()),
        None,
    );
    let summary = second.enricher.run_all().await.unwrap();

    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 1);
    assert!(second.searcher.calls().is_empty());
    assert!(second.fetcher.calls().is_empty());
    assert_eq!(std::fs::read(&path).unwrap(), after_first);
}

#[tokio::test]
async fn test_adequate_base_plot_is_skipped() {
    let dir = TempDir::new().unwrap();
    let record = MovieRecord::new("Long Film", "2019").with_plot("A detailed plot. ".repeat(60));
    MovieStore::new(dir.path()).insert(&record).await.unwrap();

    let h = harness(dir.path(), MockWebSearcher::new(), MockFetcher::new(), None);
    let outcome = h.enricher.run_one("Long-Film-2019").await.unwrap();

    assert_eq!(outcome, EnrichmentOutcome::skipped(SkipReason::Adequate));
    assert!(h.searcher.calls().is_empty());
}

#[tokio::test]
async fn test_clean_then_reenrich() {
    let dir = TempDir::new().unwrap();
    let path = write_record(
        dir.path(),
        "Test-Film-2020.json",
        &serde_json::json!({
            "title": "Test Film",
            "year": "2020",
            "plot": "A short plot.",
            "web_plot": COOKIE_BANNER,
            "raw_web_plot": "original source text",
            "plot_source": "web_scraped",
        })
        .to_string(),
    );

    let maintenance = PlotMaintenance::new(
        MovieStore::new(dir.path()),
        EnricherConfig::default().thresholds,
    );
    let summary = maintenance.clean(false).await.unwrap();
    assert_eq!(summary.cleaned, 1);
    assert_eq!(summary.cleaned_files, vec!["Test-Film-2020.json"]);

    let cleaned = load(&path);
    assert!(cleaned.web_plot.is_none());
    assert!(cleaned.plot_source.is_none());
    assert_eq!(cleaned.raw_web_plot.as_deref(), Some("original source text"));
    assert!(cleaned.last_updated.is_some());

    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[WIKI_URL]),
        MockFetcher::new().with_page(WIKI_URL, wiki_page()),
        None,
    );
    assert_eq!(h.enricher.run_all().await.unwrap().updated, 1);
    assert_eq!(load(&path).web_plot, Some(wiki_text()));

    // A second clean finds nothing to do.
    let summary = maintenance.clean(false).await.unwrap();
    assert_eq!(summary.cleaned, 0);
}

// ============================================================================
// Batch robustness
// ============================================================================

#[tokio::test]
async fn test_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let h = harness(
        &dir.path().join("nope"),
        MockWebSearcher::new(),
        MockFetcher::new(),
        None,
    );
    assert!(matches!(
        h.enricher.run_all().await,
        Err(EnrichError::StorageDirMissing(_))
    ));
}

#[tokio::test]
async fn test_empty_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_record(dir.path(), "notes.txt", "not a record");
    let h = harness(dir.path(), MockWebSearcher::new(), MockFetcher::new(), None);
    assert!(matches!(
        h.enricher.run_all().await,
        Err(EnrichError::NoRecords(_))
    ));
}

#[tokio::test]
async fn test_unknown_record_name() {
    let dir = TempDir::new().unwrap();
    test_film(dir.path());
    let h = harness(dir.path(), MockWebSearcher::new(), MockFetcher::new(), None);
    assert!(matches!(
        h.enricher.run_one("Missing-1999").await,
        Err(EnrichError::RecordNotFound(_))
    ));
}

#[tokio::test]
async fn test_malformed_records_do_not_abort_batch() {
    let dir = TempDir::new().unwrap();
    write_record(dir.path(), "Broken-2020.json", "{oops");
    write_record(dir.path(), "No-Title-2020.json", r#"{"year": 2020}"#);
    let path = test_film(dir.path());

    let h = harness(
        dir.path(),
        MockWebSearcher::new().with_fallback_urls(&[WIKI_URL]),
        MockFetcher::new().with_page(WIKI_URL, wiki_page()),
        None,
    );
    let summary = h.enricher.run_all().await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.updated, 1);
    assert!(load(&path).web_plot.is_some());

    // Politeness delay between each pair of records.
    let delays = h.sleeper.sleeps();
    assert_eq!(delays.len(), 2);
    assert!(delays
        .iter()
        .all(|d| *d >= Duration::from_secs(2) && *d <= Duration::from_secs(4)));
}

/// Fetcher that panics on one host and serves the rest from a mock.
struct ExplodingFetcher(MockFetcher);

#[async_trait]
impl PageFetcher for ExplodingFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        if url.contains("explode.example.com") {
            panic!("fetcher blew up on {}", url);
        }
        self.0.fetch(url).await
    }
}

#[tokio::test]
async fn test_panic_is_contained_to_one_record() {
    let dir = TempDir::new().unwrap();
    write_record(
        dir.path(),
        "Explode-Film-2020.json",
        r#"{"title": "Explode Film", "year": 2020}"#,
    );
    let path = test_film(dir.path());

    let searcher = MockWebSearcher::new()
        .with_urls(
            "Explode Film 2020 plot summary wikipedia",
            &["https://explode.example.com/film"],
        )
        .with_fallback_urls(&[WIKI_URL]);
    let fetcher = ExplodingFetcher(MockFetcher::new().with_page(WIKI_URL, wiki_page()));

    let enricher = PlotEnricher::new(
        EnricherConfig::default()
            .with_movies_dir(dir.path())
            .with_normalize(false),
        Arc::new(searcher),
        Arc::new(fetcher),
        Arc::new(RecordingSleeper::new()),
    );

    let summary = enricher.run_all().await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 1);
    assert!(load(&path).web_plot.is_some());
}
