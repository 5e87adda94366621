//! SQLite schema

use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS novels (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    slug          TEXT NOT NULL,
    source_site   TEXT NOT NULL,
    title         TEXT,
    author        TEXT,
    description   TEXT,
    cover_url     TEXT,
    status        TEXT NOT NULL DEFAULT 'ongoing',
    genres        TEXT NOT NULL DEFAULT '',
    rating        REAL,
    year          INTEGER,
    chapter_count INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    UNIQUE (source_site, slug)
);

CREATE TABLE IF NOT EXISTS chapters (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    novel_id       INTEGER NOT NULL REFERENCES novels(id) ON DELETE CASCADE,
    chapter_number INTEGER NOT NULL,
    title          TEXT NOT NULL,
    content        TEXT NOT NULL,
    word_count     INTEGER NOT NULL,
    fetched_at     TEXT NOT NULL,
    UNIQUE (novel_id, chapter_number)
);

CREATE INDEX IF NOT EXISTS idx_chapters_novel ON chapters(novel_id);
";

/// Creates all tables and indexes if absent
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
