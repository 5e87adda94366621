//! Sequential chapter crawl engine
//!
//! Walks chapter slots in order from a start number, fetching, validating,
//! extracting, and persisting one chapter per slot. All failure kinds feed a
//! single consecutive-failure counter; the crawl halts when the counter
//! reaches the configured threshold or the end bound is passed. The engine
//! never aborts with an error: every run produces a [`CrawlSummary`].

use crate::config::CrawlSettings;
use crate::extract::ExtractionStrategy;
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::store::ChapterStore;
use scraper::Html;
use std::time::Duration;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The requested end chapter was reached
    EndBound,
    /// Too many consecutive slot failures
    FailureThreshold,
}

/// Outcome of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub chapters_written: u32,
    pub words_written: u64,
    /// Last chapter slot the engine attempted or skipped
    pub last_chapter_attempted: u32,
    pub halt: HaltReason,
}

/// Transient position of a crawl in progress
struct CrawlCursor {
    chapter: u32,
    url: String,
    consecutive_failures: u32,
    chapters_written: u32,
    words_written: u64,
}

impl CrawlCursor {
    /// Moves to a discovered next chapter, or one past the current slot
    fn advance(&mut self, next: Option<(u32, String)>, fallback_url: String) {
        match next {
            Some((number, url)) if number > self.chapter => {
                self.chapter = number;
                self.url = url;
            }
            _ => {
                self.chapter += 1;
                self.url = fallback_url;
            }
        }
    }
}

/// Drives a sequential crawl over one novel
pub struct CrawlEngine<'a> {
    fetcher: &'a PageFetcher,
    strategy: &'a dyn ExtractionStrategy,
    store: &'a mut dyn ChapterStore,
    settings: &'a CrawlSettings,
}

impl<'a> CrawlEngine<'a> {
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

    /// Crawls chapters of `slug` from `start` until the end bound (inclusive)
    /// or the failure threshold
    pub async fn run(
        &mut self,
        novel_id: i64,
        slug: &str,
        start: u32,
        end: Option<u32>,
        skip_existing: bool,
    ) -> CrawlSummary {
        let mut cursor = CrawlCursor {
            chapter: start,
            url: self.strategy.build_chapter_url(slug, start),
            consecutive_failures: 0,
            chapters_written: 0,
            words_written: 0,
        };
        let threshold = self.settings.max_consecutive_failures;
        let mut last_attempted = start;

        let halt = loop {
            if end.is_some_and(|bound| cursor.chapter > bound) {
                break HaltReason::EndBound;
            }
            last_attempted = cursor.chapter;

            // Skipped slots advance without touching the network, so no
            // politeness pause either.
            match self.slot_is_skippable(novel_id, cursor.chapter, skip_existing) {
                Ok(true) => {
                    tracing::info!("Chapter {} already stored, skipping", cursor.chapter);
                    let fallback = self.strategy.build_chapter_url(slug, cursor.chapter + 1);
                    cursor.advance(None, fallback);
                    continue;
                }
                Ok(false) => {}
                Err(reason) => {
                    if self.record_failure(&mut cursor, threshold, &reason) {
                        break HaltReason::FailureThreshold;
                    }
                    let fallback = self.strategy.build_chapter_url(slug, cursor.chapter + 1);
                    cursor.advance(None, fallback);
                    continue;
                }
            }

            let (succeeded, next) = self.process_slot(novel_id, &mut cursor).await;
            if !succeeded {
                let reason = format!("chapter {} failed", cursor.chapter);
                if self.record_failure(&mut cursor, threshold, &reason) {
                    break HaltReason::FailureThreshold;
                }
            }

            let fallback = self.strategy.build_chapter_url(slug, cursor.chapter + 1);
            cursor.advance(next, fallback);
            self.politeness_pause().await;
        };

        tracing::info!(
            "Crawl finished: {} chapters, {} words, stopped at chapter {} ({:?})",
            cursor.chapters_written,
            cursor.words_written,
            last_attempted,
            halt
        );

        CrawlSummary {
            chapters_written: cursor.chapters_written,
            words_written: cursor.words_written,
            last_chapter_attempted: last_attempted,
            halt,
        }
    }

    fn slot_is_skippable(
        &self,
        novel_id: i64,
        chapter: u32,
        skip_existing: bool,
    ) -> Result<bool, String> {
        if !skip_existing {
            return Ok(false);
        }
        self.store
            .chapter_exists(novel_id, chapter)
            .map_err(|e| format!("existence check for chapter {} failed: {}", chapter, e))
    }

    /// Fetches and processes one chapter slot
    ///
    /// Returns whether the slot produced a persisted chapter, plus the next
    /// position discovered from the page's own navigation. Only a persisted
    /// chapter's page is trusted for navigation; failed slots advance by the
    /// deterministic fallback instead.
    async fn process_slot(
        &mut self,
        novel_id: i64,
        cursor: &mut CrawlCursor,
    ) -> (bool, Option<(u32, String)>) {
        let chapter = cursor.chapter;

        let (final_url, body) = match self.fetcher.fetch(&cursor.url).await {
            FetchOutcome::Document { final_url, body } => (final_url, body),
            FetchOutcome::TransientFailure { reason } | FetchOutcome::Exhausted { reason } => {
                tracing::warn!("Chapter {} fetch failed: {}", chapter, reason);
                return (false, None);
            }
        };

        // Parsing and extraction are scoped so the document is gone before
        // the next await point.
        let (draft, next) = {
            let doc = Html::parse_document(&body);

            if !self.strategy.is_chapter_page(&doc, &final_url, chapter) {
                tracing::warn!("Chapter {} page failed validation: {}", chapter, final_url);
                return (false, None);
            }

            let Some(draft) = self.strategy.extract_chapter(&doc, chapter) else {
                tracing::warn!("Chapter {} extraction produced no content", chapter);
                return (false, None);
            };

            let next = self.discover_next(&doc, &final_url);
            (draft, next)
        };

        let words = draft.word_count();
        match self.store.insert_chapter(novel_id, &draft) {
            Ok(_) => {
                cursor.chapters_written += 1;
                cursor.words_written += u64::from(words);
                cursor.consecutive_failures = 0;
                tracing::info!("Stored chapter {}: {} ({} words)", chapter, draft.title, words);
                if cursor.chapters_written % 10 == 0 {
                    tracing::info!("Progress: {} chapters written", cursor.chapters_written);
                }
                (true, next)
            }
            Err(e) => {
                tracing::warn!("Chapter {} persistence failed: {}", chapter, e);
                (false, None)
            }
        }
    }

    fn discover_next(&self, doc: &Html, final_url: &str) -> Option<(u32, String)> {
        let url = self.strategy.find_next_chapter_url(doc, final_url)?;
        let number = self.strategy.chapter_number_from_url(&url)?;
        Some((number, url))
    }

    /// Bumps the failure counter; true means the threshold was reached
    fn record_failure(&self, cursor: &mut CrawlCursor, threshold: u32, reason: &str) -> bool {
        cursor.consecutive_failures += 1;
        tracing::warn!(
            "Slot failure {}/{}: {}",
            cursor.consecutive_failures,
            threshold,
            reason
        );
        if cursor.consecutive_failures >= threshold {
            tracing::error!(
                "Stopping after {} consecutive failures",
                cursor.consecutive_failures
            );
            return true;
        }
        false
    }

    async fn politeness_pause(&self) {
        let delay = match self.settings.politeness_override_ms {
            Some(ms) => Duration::from_millis(ms),
            None => self.strategy.politeness_delay(),
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
