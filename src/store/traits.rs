//! Persistence boundary for novels and chapters

use crate::extract::{ChapterDraft, NovelMetadata, NovelStatus, SourceSite};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chapter {chapter_number} already stored for novel {novel_id}")]
    DuplicateChapter { novel_id: i64, chapter_number: u32 },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A novel row as persisted
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: i64,
    pub slug: String,
    pub source_site: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub status: NovelStatus,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub year: Option<u32>,
    pub chapter_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A chapter row as persisted
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: i64,
    pub novel_id: i64,
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub fetched_at: DateTime<Utc>,
}

/// Storage operations the crawl pipeline depends on
///
/// Novels are keyed by (source site, slug); chapters by (novel, chapter
/// number). Both pairs carry unique constraints, so a duplicate chapter
/// insert surfaces as [`StoreError::DuplicateChapter`] instead of producing
/// a second row.
pub trait ChapterStore {
    /// Looks up a novel by its site and slug
    fn find_novel_by_slug(
        &self,
        site: SourceSite,
        slug: &str,
    ) -> StoreResult<Option<NovelRecord>>;

    /// Inserts or refreshes a novel's metadata, returning its row id
    ///
    /// On refresh every metadata field is overwritten, including
    /// `chapter-count` from the homepage's declared count (later reconciled
    /// against the stored chapters after a crawl); `created-at` is
    /// preserved.
    fn upsert_novel(&mut self, site: SourceSite, metadata: &NovelMetadata) -> StoreResult<i64>;

    /// Whether a chapter number is already stored for a novel
    fn chapter_exists(&self, novel_id: i64, chapter_number: u32) -> StoreResult<bool>;

    /// Persists a chapter, returning its row id
    fn insert_chapter(&mut self, novel_id: i64, draft: &ChapterDraft) -> StoreResult<i64>;

    /// Number of chapters stored for a novel
    fn count_chapters(&self, novel_id: i64) -> StoreResult<u32>;

    /// Writes the reconciled chapter count onto the novel row
    fn update_novel_chapter_count(&mut self, novel_id: i64, count: u32) -> StoreResult<()>;
}

/// Genre list encoding for a single TEXT column
pub(crate) fn genres_to_db(genres: &[String]) -> String {
    genres.join("|")
}

pub(crate) fn genres_from_db(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}
