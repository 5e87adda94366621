//! Novel ingestion pipeline
//!
//! Ties the pieces together for one novel: resolve and persist its homepage
//! metadata, then hand the chapter range to the crawl engine and reconcile
//! the stored chapter count afterwards. The homepage is the only stage that
//! can fail the run outright; from there on every problem is a crawl-slot
//! failure absorbed by the engine.

use crate::config::CrawlSettings;
use crate::engine::{CrawlEngine, HaltReason};
use crate::extract::ExtractionStrategy;
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::store::ChapterStore;
use crate::{LoomError, Result};
use scraper::Html;

/// Options for one ingestion run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub start_chapter: u32,
    /// Inclusive end bound; `None` crawls until the failure threshold
    pub end_chapter: Option<u32>,
    /// Refresh metadata only, no chapter crawl
    pub novel_only: bool,
    /// Advance past already-stored chapters without refetching them
    pub skip_existing: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            start_chapter: 1,
            end_chapter: None,
            novel_only: false,
            skip_existing: true,
        }
    }
}

/// What an ingestion run accomplished
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub novel_id: i64,
    pub novel_title: Option<String>,
    pub chapters_written: u32,
    pub words_written: u64,
    /// Total chapters stored for the novel after the run
    pub total_chapters_stored: u32,
    /// `None` when the run was metadata-only
    pub halt: Option<HaltReason>,
}

/// Runs the full ingestion pipeline for single novels
pub struct NovelIngestor<'a> {
    fetcher: &'a PageFetcher,
    strategy: &'a dyn ExtractionStrategy,
    store: &'a mut dyn ChapterStore,
    settings: &'a CrawlSettings,
}

impl<'a> NovelIngestor<'a> {
    pub fn new(
        fetcher: &'a PageFetcher,
        strategy: &'a dyn ExtractionStrategy,
        store: &'a mut dyn ChapterStore,
        settings: &'a CrawlSettings,
    ) -> Self {
        Self {
            fetcher,
            strategy,
            store,
            settings,
        }
    }

    /// Ingests one novel by slug
    ///
    /// Fails only when the homepage cannot be fetched or yields no metadata;
    /// chapter-level problems are summarized in the report instead.
    pub async fn ingest(&mut self, slug: &str, options: &IngestOptions) -> Result<IngestReport> {
        let homepage = self.strategy.homepage_url(slug);
        tracing::info!("Resolving novel '{}' from {}", slug, homepage);

        let body = match self.fetcher.fetch(&homepage).await {
            FetchOutcome::Document { body, .. } => body,
            FetchOutcome::TransientFailure { reason } | FetchOutcome::Exhausted { reason } => {
                return Err(LoomError::HomepageUnavailable {
                    slug: slug.to_string(),
                    reason,
                });
            }
        };

        let metadata = {
            let doc = Html::parse_document(&body);
            self.strategy.extract_metadata(&doc, slug)
        }
        .ok_or_else(|| LoomError::MetadataUnavailable {
            slug: slug.to_string(),
        })?;

        let novel_id = self.store.upsert_novel(self.strategy.site(), &metadata)?;
        tracing::info!(
            "Novel '{}' stored as id {} ({} declared chapters)",
            metadata.title.as_deref().unwrap_or(slug),
            novel_id,
            metadata.declared_chapters
        );

        if options.novel_only {
            let total = self.store.count_chapters(novel_id)?;
            return Ok(IngestReport {
                novel_id,
                novel_title: metadata.title,
                chapters_written: 0,
                words_written: 0,
                total_chapters_stored: total,
                halt: None,
            });
        }

        let summary = CrawlEngine::new(self.fetcher, self.strategy, &mut *self.store, self.settings)
            .run(
                novel_id,
                slug,
                options.start_chapter,
                options.end_chapter,
                options.skip_existing,
            )
            .await;

        // The homepage's declared count drifts; the stored count is the
        // source of truth after a crawl.
        let total = self.store.count_chapters(novel_id)?;
        self.store.update_novel_chapter_count(novel_id, total)?;

        Ok(IngestReport {
            novel_id,
            novel_title: metadata.title,
            chapters_written: summary.chapters_written,
            words_written: summary.words_written,
            total_chapters_stored: total,
            halt: Some(summary.halt),
        })
    }
}
