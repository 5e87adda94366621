//! Extraction strategies for supported source sites
//!
//! Per-site HTML structure is unstable and inconsistent, so every extraction
//! operation is expressed as an ordered list of candidate heuristics
//! evaluated until one succeeds (see [`cascade`]). The engine consumes the
//! [`ExtractionStrategy`] trait and never touches site-specific HTML.

pub mod cascade;
mod sites;
pub mod text;

pub use sites::{DivineDaoStrategy, NovelBinStrategy, WuxiaworldStrategy};

use regex::Regex;
use scraper::Html;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// Matches the chapter number embedded in a chapter URL.
///
/// This takes the first `chapter-<n>` occurrence anywhere in the URL, so an
/// unrelated number embedded earlier in the path would win. Known fragility,
/// shared with the sites' own URL schemes.
static CHAPTER_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"chapter-(\d+)").unwrap());

/// Parses a chapter number out of a chapter URL
pub fn chapter_number_from_url(url: &str) -> Option<u32> {
    CHAPTER_NUMBER_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Publication status of a novel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NovelStatus {
    Ongoing,
    Completed,
    Hiatus,
}

impl NovelStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Hiatus => "hiatus",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            "hiatus" => Some(Self::Hiatus),
            _ => None,
        }
    }
}

impl fmt::Display for NovelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Novel metadata scraped from a homepage
///
/// Extraction is best-effort: absent fields stay `None` rather than failing
/// the whole page. Only the slug is authoritative; everything else is
/// overwritten on each refresh.
#[derive(Debug, Clone)]
pub struct NovelMetadata {
    pub slug: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    /// Chapter count as advertised by the homepage; often inaccurate and
    /// reconciled against the persisted count after a crawl.
    pub declared_chapters: u32,
    pub status: NovelStatus,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub year: Option<u32>,
}

impl NovelMetadata {
    /// Creates an empty metadata record for a slug
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: None,
            author: None,
            description: None,
            cover_url: None,
            declared_chapters: 0,
            status: NovelStatus::Ongoing,
            genres: Vec::new(),
            rating: None,
            year: None,
        }
    }
}

/// A chapter extracted from a page, not yet tied to a stored novel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDraft {
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
}

impl ChapterDraft {
    /// Whitespace-delimited word count of the content
    pub fn word_count(&self) -> u32 {
        text::word_count(&self.content) as u32
    }
}

/// Site-specific rules for recognizing and extracting novel pages
///
/// All document operations are pure: they inspect the parsed HTML and never
/// perform IO. The engine owns all control-flow decisions.
pub trait ExtractionStrategy {
    /// The site this strategy targets
    fn site(&self) -> SourceSite;

    /// URL of the novel's homepage for a slug
    fn homepage_url(&self, slug: &str) -> String;

    /// Deterministic chapter URL from the site's path template
    ///
    /// Used for the first request and as the fallback when navigation-link
    /// discovery fails.
    fn build_chapter_url(&self, slug: &str, chapter: u32) -> String;

    /// Distinguishes an actual chapter page from a redirect-to-homepage or
    /// an off-topic page
    fn is_chapter_page(&self, doc: &Html, final_url: &str, expected_chapter: u32) -> bool;

    /// Extracts a clean chapter, or `None` when the page holds no real
    /// chapter content
    fn extract_chapter(&self, doc: &Html, chapter: u32) -> Option<ChapterDraft>;

    /// Best-effort metadata extraction from a novel homepage
    ///
    /// Returns `None` only when the document does not look like a novel
    /// homepage at all; partial field coverage is a success.
    fn extract_metadata(&self, doc: &Html, slug: &str) -> Option<NovelMetadata>;

    /// Searches for an explicit "next chapter" navigation affordance
    fn find_next_chapter_url(&self, doc: &Html, current_url: &str) -> Option<String>;

    /// Parses a chapter number out of a discovered next-chapter URL
    fn chapter_number_from_url(&self, url: &str) -> Option<u32> {
        chapter_number_from_url(url)
    }

    /// Fixed pause between requests to this site
    fn politeness_delay(&self) -> Duration;
}

/// Identifier for a supported source site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSite {
    Wuxiaworld,
    NovelBin,
    DivineDao,
}

impl SourceSite {
    /// Parses a site identifier as given on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wuxiaworld" => Some(Self::Wuxiaworld),
            "novelbin" => Some(Self::NovelBin),
            "divinedao" => Some(Self::DivineDao),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wuxiaworld => "wuxiaworld",
            Self::NovelBin => "novelbin",
            Self::DivineDao => "divinedao",
        }
    }

    /// All supported sites, for CLI help text
    pub fn all() -> &'static [Self] {
        &[Self::Wuxiaworld, Self::NovelBin, Self::DivineDao]
    }
}

impl fmt::Display for SourceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Looks up the extraction strategy for a site
pub fn strategy_for(site: SourceSite) -> Box<dyn ExtractionStrategy> {
    match site {
        SourceSite::Wuxiaworld => Box::new(WuxiaworldStrategy::default()),
        SourceSite::NovelBin => Box::new(NovelBinStrategy::default()),
        SourceSite::DivineDao => Box::new(DivineDaoStrategy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_number_from_url() {
        assert_eq!(
            chapter_number_from_url("https://example.com/novel/foo/chapter-42/"),
            Some(42)
        );
        assert_eq!(chapter_number_from_url("https://example.com/novel/foo"), None);
    }

    #[test]
    fn test_chapter_number_takes_first_match() {
        // Documented fragility: the first chapter-<n> in the URL wins.
        assert_eq!(
            chapter_number_from_url("https://example.com/chapter-3/extra/chapter-9"),
            Some(3)
        );
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            NovelStatus::Ongoing,
            NovelStatus::Completed,
            NovelStatus::Hiatus,
        ] {
            assert_eq!(
                NovelStatus::from_db_string(status.to_db_string()),
                Some(status)
            );
        }
        assert_eq!(NovelStatus::from_db_string("unknown"), None);
    }

    #[test]
    fn test_source_site_parse() {
        assert_eq!(SourceSite::parse("wuxiaworld"), Some(SourceSite::Wuxiaworld));
        assert_eq!(SourceSite::parse("NovelBin"), Some(SourceSite::NovelBin));
        assert_eq!(SourceSite::parse("divinedao"), Some(SourceSite::DivineDao));
        assert_eq!(SourceSite::parse("webnovel"), None);
    }

    #[test]
    fn test_strategy_registry_covers_all_sites() {
        for site in SourceSite::all() {
            let strategy = strategy_for(*site);
            assert_eq!(strategy.site(), *site);
        }
    }

    #[test]
    fn test_draft_word_count() {
        let draft = ChapterDraft {
            chapter_number: 1,
            title: "Chapter 1".to_string(),
            content: "one two three".to_string(),
        };
        assert_eq!(draft.word_count(), 3);
    }
}
