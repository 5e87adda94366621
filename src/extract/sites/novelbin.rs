//! Extraction strategy for novelbin.com
//!
//! Novelbin pages bury the chapter prose in an unmarked flow of navigation
//! links, ads, and footer text. Content is recovered by splitting the page
//! text on the chapter-navigation labels and keeping the longest candidate,
//! then stripping the site's known boilerplate patterns.

use crate::extract::{
    cascade, text, ChapterDraft, ExtractionStrategy, NovelMetadata, SourceSite,
};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

const BASE_URL: &str = "https://novelbin.com";
const POLITENESS_DELAY: Duration = Duration::from_secs(2);

const TITLE_SELECTORS: &[&str] = &["h2", "h1", ".chr-title", ".chapter-title"];

/// Navigation labels that bracket the chapter body in the text flow
static NAV_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:prev chapter|next chapter)").unwrap());

/// Site boilerplate stripped from the recovered chapter body, in order
static BOILERPLATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)enhance your reading experience.*$",
        r"(?is)read novel online full.*$",
        r"(?is)novel\s*bin\b.*$",
        r"(?is)a/n.*?thank you.*?\^\^",
        r"(?is)remove ads.*$",
        r"(?is)report chapter.*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CHAPTER_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chapter\s*\d+").unwrap());

static SITE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-\s*novel\s*bin.*$").unwrap());

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rating\s*:\s*([0-9.]+)\s*/\s*10").unwrap());

static DECLARED_CHAPTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chapter\s+(\d+)").unwrap());

static DESCRIPTION_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)description\s*(.*?)(?:chapter list|more from author|$)").unwrap()
});

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

#[derive(Debug, Clone)]
pub struct NovelBinStrategy {
    base_url: String,
}

impl Default for NovelBinStrategy {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }
}

impl NovelBinStrategy {
    /// Points the strategy at a different host, used by tests
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Recovers the chapter body from the page's full text flow
    fn content_from_text_flow(&self, doc: &Html) -> Option<String> {
        let page_text = text::element_text_with_breaks(doc.root_element());
        let candidate = NAV_SPLIT_RE
            .split(&page_text)
            .filter(|part| part.len() > 100)
            .max_by_key(|part| part.len())?
            .to_string();

        let mut body = candidate;
        for pattern in BOILERPLATE_RES.iter() {
            body = pattern.replace_all(&body, "").into_owned();
        }
        Some(text::clean_content_lines(&body))
    }
}

impl ExtractionStrategy for NovelBinStrategy {
    fn site(&self) -> SourceSite {
        SourceSite::NovelBin
    }

    fn homepage_url(&self, slug: &str) -> String {
        format!("{}/b/{}", self.base_url, slug)
    }

    fn build_chapter_url(&self, slug: &str, chapter: u32) -> String {
        format!("{}/b/{}/chapter-{}", self.base_url, slug, chapter)
    }

    fn is_chapter_page(&self, doc: &Html, final_url: &str, expected_chapter: u32) -> bool {
        if !final_url.contains(&format!("chapter-{}", expected_chapter)) {
            return false;
        }
        let page_text = cascade::element_text(doc.root_element());
        if text::homepage_marker_count(&page_text) >= 3 {
            return false;
        }
        text::word_count(&page_text) > 100
    }

    fn extract_chapter(&self, doc: &Html, chapter: u32) -> Option<ChapterDraft> {
        let title = cascade::first_text(doc, TITLE_SELECTORS)
            .filter(|t| CHAPTER_TITLE_RE.is_match(t) || t.len() < 100)
            .unwrap_or_else(|| format!("Chapter {}", chapter));

        let content = self.content_from_text_flow(doc)?;
        if !text::passes_quality_gate(&content) {
            tracing::warn!("Rejected low-quality content for chapter {}", chapter);
            return None;
        }

        Some(ChapterDraft {
            chapter_number: chapter,
            title,
            content,
        })
    }

    fn extract_metadata(&self, doc: &Html, slug: &str) -> Option<NovelMetadata> {
        let mut metadata = NovelMetadata::new(slug);

        metadata.title = cascade::first_text(doc, &["h1", ".novel-title", "title"])
            .map(|t| SITE_SUFFIX_RE.replace(&t, "").trim().to_string())
            .filter(|t| t.len() > 3);

        metadata.author = cascade::first_text(doc, &["a[href*='/a/']", ".author a"]);
        metadata.genres =
            cascade::first_text_list(doc, &["a[href*='/genre/']", ".genres a"]).unwrap_or_default();

        let page_text = cascade::element_text(doc.root_element());
        if cascade::first_element(doc, &["a[href*='/sort/completed']"]).is_some()
            || page_text.to_lowercase().contains("status : completed")
        {
            metadata.status = crate::extract::NovelStatus::Completed;
        }

        metadata.rating = RATING_RE
            .captures(&page_text)
            .and_then(|caps| caps[1].parse().ok());

        metadata.year = cascade::first_text(doc, &["a[href*='/year/']"])
            .and_then(|t| YEAR_RE.find(&t).map(|m| m.as_str().to_string()))
            .and_then(|y| y.parse().ok());

        metadata.description = cascade::first_attr(doc, &["meta[name='description']"], "content")
            .or_else(|| {
                DESCRIPTION_SPAN_RE
                    .captures(&page_text)
                    .map(|caps| caps[1].trim().to_string())
                    .filter(|d| !d.is_empty())
            });

        metadata.cover_url = cascade::first_attr(doc, &[".book img", "img.cover"], "src")
            .map(|src| super::absolutize(&self.base_url, &src));

        metadata.declared_chapters = DECLARED_CHAPTERS_RE
            .captures(&page_text)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);

        if metadata.title.is_none() && metadata.declared_chapters == 0 {
            return None;
        }
        Some(metadata)
    }

    fn find_next_chapter_url(&self, doc: &Html, current_url: &str) -> Option<String> {
        let selector = Selector::parse("a[href*='chapter-']").ok()?;
        for anchor in doc.select(&selector) {
            let label = cascade::element_text(anchor).to_lowercase();
            if !label.contains("next") {
                continue;
            }
            if let Some(href) = anchor.value().attr("href") {
                let resolved = super::resolve_href(current_url, href)?;
                if resolved != current_url {
                    return Some(resolved);
                }
            }
        }
        None
    }

    fn politeness_delay(&self) -> Duration {
        POLITENESS_DELAY
    }
}
