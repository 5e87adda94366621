//! Persistence for crawled novels and chapters
//!
//! The pipeline talks to the [`ChapterStore`] trait; [`SqliteStore`] is the
//! one production implementation. Novels are unique per (source site, slug)
//! and chapters per (novel, chapter number), enforced by the schema.

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA};
pub use sqlite::SqliteStore;
pub use traits::{ChapterRecord, ChapterStore, NovelRecord, StoreError, StoreResult};
