//! Novel-Loom main entry point
//!
//! This is the command-line interface for the Novel-Loom chapter harvester.

use clap::Parser;
use novel_loom::config::load_config_or_default;
use novel_loom::ingest::{IngestOptions, NovelIngestor};
use novel_loom::{strategy_for, LoomError, PageFetcher, SourceSite, SqliteStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Novel-Loom: a sequential novel chapter harvester
///
/// Novel-Loom resolves a novel's metadata from its homepage on a supported
/// source site, then crawls its chapters in order, one polite request at a
/// time, storing clean prose in a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "novel-loom")]
#[command(version = "1.0.0")]
#[command(about = "A sequential novel chapter harvester", long_about = None)]
struct Cli {
    /// Novel slug as it appears in the site's URLs
    #[arg(long, value_name = "SLUG")]
    novel_slug: String,

    /// Source site: wuxiaworld, novelbin, or divinedao
    #[arg(long, value_name = "SITE")]
    site: String,

    /// First chapter to crawl
    #[arg(long, default_value_t = 1)]
    start_chapter: u32,

    /// Last chapter to crawl (inclusive); open-ended when omitted
    #[arg(long)]
    end_chapter: Option<u32>,

    /// Refresh novel metadata only, without crawling chapters
    #[arg(long)]
    novel_only: bool,

    /// Skip chapters already in the database instead of refetching them
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    skip_existing: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let site = SourceSite::parse(&cli.site)
        .ok_or_else(|| LoomError::UnknownSite(cli.site.clone()))?;

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let strategy = strategy_for(site);
    let fetcher = PageFetcher::new(config.fetch.clone())?;
    let mut store = SqliteStore::open(Path::new(&config.database.path))?;

    let options = IngestOptions {
        start_chapter: cli.start_chapter,
        end_chapter: cli.end_chapter,
        novel_only: cli.novel_only,
        skip_existing: cli.skip_existing,
    };

    tracing::info!(
        "Ingesting '{}' from {} (chapters {}..{})",
        cli.novel_slug,
        site,
        options.start_chapter,
        options
            .end_chapter
            .map(|e| e.to_string())
            .unwrap_or_else(|| "end".to_string())
    );

    let mut ingestor =
        NovelIngestor::new(&fetcher, strategy.as_ref(), &mut store, &config.crawl);
    match ingestor.ingest(&cli.novel_slug, &options).await {
        Ok(report) => {
            println!(
                "Novel: {} (id {})",
                report.novel_title.as_deref().unwrap_or(&cli.novel_slug),
                report.novel_id
            );
            println!(
                "Chapters written this run: {} ({} words)",
                report.chapters_written, report.words_written
            );
            println!("Chapters stored in total:  {}", report.total_chapters_stored);
            if let Some(halt) = report.halt {
                println!("Stopped: {:?}", halt);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Ingestion failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("novel_loom=info,warn"),
            1 => EnvFilter::new("novel_loom=debug,info"),
            2 => EnvFilter::new("novel_loom=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
