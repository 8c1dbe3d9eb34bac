//! CLI for web plot enrichment
//!
//! Runs the enrichment pipeline over a directory of movie records, or a
//! maintenance pass over the stored plots. The final summary is printed as
//! JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plot_enricher::{
    EnrichmentOutcome, FetchConfig, HttpFetcher, MovieStore, PlotEnricher, PlotMaintenance,
    Settings, Sleeper, TokioSleeper,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "plot-enricher")]
#[command(about = "Enrich movie records with plot text found on the web")]
struct Cli {
    /// Directory of movie record JSON files (overrides MOVIES_DIR)
    #[arg(long, global = true)]
    movies_dir: Option<PathBuf>,

    /// Search API key (overrides the provider's environment variable)
    #[arg(long, global = true)]
    search_key: Option<String>,

    /// Store raw extracted text without generative normalization
    #[arg(long, global = true)]
    no_normalize: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich every record in the directory
    Run,

    /// Enrich a single record by path, file name or stem
    One { name: String },

    /// Blank stored web plots that no longer validate
    Clean {
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove all web plot fields from every record
    Reset {
        #[arg(long)]
        dry_run: bool,
    },
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize summary")?
    );
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,plot_enricher=debug,reqwest=warn,hyper=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(dir) = &cli.movies_dir {
        settings = settings.with_movies_dir(dir);
    }
    if let Some(key) = cli.search_key.clone() {
        settings = settings.with_search_key(key);
    }

    match cli.command {
        Commands::Run => cmd_run(&settings, cli.no_normalize).await,
        Commands::One { ref name } => cmd_one(&settings, cli.no_normalize, name).await,
        Commands::Clean { dry_run } => cmd_clean(&settings, dry_run).await,
        Commands::Reset { dry_run } => cmd_reset(&settings, dry_run).await,
    }
}

fn build_enricher(settings: &Settings, no_normalize: bool) -> Result<PlotEnricher> {
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
    let fetcher =
        HttpFetcher::new(&FetchConfig::default()).context("Failed to build HTTP client")?;

    let config = settings.enricher_config().with_normalize(!no_normalize);
    let mut enricher = PlotEnricher::new(
        config,
        settings.searcher()?,
        Arc::new(fetcher),
        sleeper.clone(),
    );

    if !no_normalize {
        if let Some(normalizer) = settings.normalizer(sleeper)? {
            enricher = enricher.with_normalizer(normalizer);
        }
    }

    Ok(enricher)
}

async fn cmd_run(settings: &Settings, no_normalize: bool) -> Result<ExitCode> {
    let enricher = build_enricher(settings, no_normalize)?;
    tracing::info!(dir = %settings.movies_dir.display(), "Starting plot enrichment");

    let summary = enricher
        .run_all()
        .await
        .with_context(|| format!("Enrichment of {} failed", settings.movies_dir.display()))?;

    tracing::info!("{}", summary);
    output(&summary)?;
    Ok(exit_code(summary.updated > 0))
}

async fn cmd_one(settings: &Settings, no_normalize: bool, name: &str) -> Result<ExitCode> {
    let enricher = build_enricher(settings, no_normalize)?;

    let outcome = enricher
        .run_one(name)
        .await
        .with_context(|| format!("Failed to enrich {}", name))?;

    output(&outcome)?;
    Ok(exit_code(!matches!(outcome, EnrichmentOutcome::Failed { .. })))
}

async fn cmd_clean(settings: &Settings, dry_run: bool) -> Result<ExitCode> {
    let maintenance = PlotMaintenance::new(
        MovieStore::new(&settings.movies_dir),
        settings.enricher_config().thresholds,
    );

    let summary = maintenance
        .clean(dry_run)
        .await
        .context("Maintenance pass failed")?;

    output(&summary)?;
    Ok(exit_code(summary.errors == 0))
}

async fn cmd_reset(settings: &Settings, dry_run: bool) -> Result<ExitCode> {
    let maintenance = PlotMaintenance::new(
        MovieStore::new(&settings.movies_dir),
        settings.enricher_config().thresholds,
    );

    let summary = maintenance
        .reset(dry_run)
        .await
        .context("Reset pass failed")?;

    output(&summary)?;
    Ok(exit_code(summary.errors == 0))
}
