//! SQLite-backed chapter store

use crate::extract::{ChapterDraft, NovelMetadata, NovelStatus, SourceSite};
use crate::store::schema::initialize_schema;
use crate::store::traits::{
    genres_from_db, genres_to_db, ChapterRecord, ChapterStore, NovelRecord, StoreError,
    StoreResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database for tests
    pub fn new_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Reads back a stored chapter
    pub fn find_chapter(
        &self,
        novel_id: i64,
        chapter_number: u32,
    ) -> StoreResult<Option<ChapterRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT * FROM chapters WHERE novel_id = ?1 AND chapter_number = ?2",
                params![novel_id, chapter_number],
                row_to_chapter,
            )
            .optional()?;
        Ok(record)
    }
}

fn row_to_chapter(row: &Row) -> Result<ChapterRecord, rusqlite::Error> {
    let fetched_raw: String = row.get("fetched_at")?;
    Ok(ChapterRecord {
        id: row.get("id")?,
        novel_id: row.get("novel_id")?,
        chapter_number: row.get("chapter_number")?,
        title: row.get("title")?,
        content: row.get("content")?,
        word_count: row.get("word_count")?,
        fetched_at: parse_timestamp(&fetched_raw),
    })
}

fn row_to_novel(row: &Row) -> Result<NovelRecord, rusqlite::Error> {
    let status_raw: String = row.get("status")?;
    let genres_raw: String = row.get("genres")?;
    let created_raw: String = row.get("created_at")?;
    let updated_raw: String = row.get("updated_at")?;

    Ok(NovelRecord {
        id: row.get("id")?,
        slug: row.get("slug")?,
        source_site: row.get("source_site")?,
        title: row.get("title")?,
        author: row.get("author")?,
        description: row.get("description")?,
        cover_url: row.get("cover_url")?,
        status: NovelStatus::from_db_string(&status_raw).unwrap_or(NovelStatus::Ongoing),
        genres: genres_from_db(&genres_raw),
        rating: row.get("rating")?,
        year: row.get("year")?,
        chapter_count: row.get("chapter_count")?,
        created_at: parse_timestamp(&created_raw),
        updated_at: parse_timestamp(&updated_raw),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl ChapterStore for SqliteStore {
    fn find_novel_by_slug(
        &self,
        site: SourceSite,
        slug: &str,
    ) -> StoreResult<Option<NovelRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT * FROM novels WHERE source_site = ?1 AND slug = ?2",
                params![site.as_str(), slug],
                row_to_novel,
            )
            .optional()?;
        Ok(record)
    }

    fn upsert_novel(&mut self, site: SourceSite, metadata: &NovelMetadata) -> StoreResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO novels (slug, source_site, title, author, description, cover_url, \
                                 status, genres, rating, year, chapter_count, created_at, \
                                 updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12) \
             ON CONFLICT (source_site, slug) DO UPDATE SET \
                 title = excluded.title, \
                 author = excluded.author, \
                 description = excluded.description, \
                 cover_url = excluded.cover_url, \
                 status = excluded.status, \
                 genres = excluded.genres, \
                 rating = excluded.rating, \
                 year = excluded.year, \
                 chapter_count = excluded.chapter_count, \
                 updated_at = excluded.updated_at",
            params![
                metadata.slug,
                site.as_str(),
                metadata.title,
                metadata.author,
                metadata.description,
                metadata.cover_url,
                metadata.status.to_db_string(),
                genres_to_db(&metadata.genres),
                metadata.rating,
                metadata.year,
                metadata.declared_chapters,
                now,
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM novels WHERE source_site = ?1 AND slug = ?2",
            params![site.as_str(), metadata.slug],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn chapter_exists(&self, novel_id: i64, chapter_number: u32) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM chapters WHERE novel_id = ?1 AND chapter_number = ?2",
            params![novel_id, chapter_number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_chapter(&mut self, novel_id: i64, draft: &ChapterDraft) -> StoreResult<i64> {
        let now = Utc::now().to_rfc3339();
        let result = self.conn.execute(
            "INSERT INTO chapters (novel_id, chapter_number, title, content, word_count, \
                                   fetched_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                novel_id,
                draft.chapter_number,
                draft.title,
                draft.content,
                draft.word_count(),
                now,
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateChapter {
                    novel_id,
                    chapter_number: draft.chapter_number,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn count_chapters(&self, novel_id: i64) -> StoreResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM chapters WHERE novel_id = ?1",
            params![novel_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn update_novel_chapter_count(&mut self, novel_id: i64, count: u32) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE novels SET chapter_count = ?1, updated_at = ?2 WHERE id = ?3",
            params![count, Utc::now().to_rfc3339(), novel_id],
        )?;
        Ok(())
    }
}
