//! Extraction strategy for wuxiaworld.site
//!
//! A WordPress-based aggregator. Theme markup varies per novel, so titles
//! and content bodies are located through selector cascades, and chapters
//! that do not exist bounce to the novel homepage with HTTP 200.

use crate::extract::{
    cascade, text, ChapterDraft, ExtractionStrategy, NovelMetadata, SourceSite,
};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

const BASE_URL: &str = "https://wuxiaworld.site";
const POLITENESS_DELAY: Duration = Duration::from_secs(2);

const TITLE_SELECTORS: &[&str] = &[
    "h1.entry-title",
    "h1.chapter-title",
    "h1",
    ".post-title h1",
    ".chapter-title",
];

const CONTENT_SELECTORS: &[&str] = &[
    ".entry-content",
    ".post-content",
    ".chapter-content",
    ".content",
    "#content",
    ".post-body",
];

const COVER_SELECTORS: &[&str] = &[
    ".summary_image img",
    ".novel-cover img",
    ".book-cover img",
    "img.cover",
];

const GENRE_SELECTORS: &[&str] = &[".genres-content a", ".genres a", ".genre-tags a", ".tags a"];

const STATUS_SELECTORS: &[&str] = &[
    ".post-status .summary-content",
    ".novel-status",
    ".status",
];

/// Structural blocks only present on novel homepages
const HOMEPAGE_BLOCK_SELECTORS: &[&str] = &[
    ".summary_image",
    ".post-status",
    ".genres-content",
    ".novel-info",
];

/// Leading "Chapter N -" or "Chapter N:" prefix on a scraped title
static TITLE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chapter\s*\d+\s*[-:]\s*").unwrap());

/// Markdown-style header emitted by some chapters inside the content body
static MD_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#{1,4}\s*(.+)$").unwrap());

static AUTHOR_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)author\(?s?\)?\s*:\s*([^\n]+)").unwrap());

#[derive(Debug, Clone)]
pub struct WuxiaworldStrategy {
    base_url: String,
}

impl Default for WuxiaworldStrategy {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }
}

impl WuxiaworldStrategy {
    /// Points the strategy at a different host, used by tests
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Promotes an embedded markdown chapter header into the title slot and
    /// strips header markers from the body
    fn fold_markdown_headers(&self, raw: &str, title: &mut String, default_title: &str) -> String {
        let mut body = String::new();
        for line in raw.lines() {
            if let Some(caps) = MD_HEADER_RE.captures(line.trim()) {
                let header = caps[1].trim().to_string();
                if *title == default_title && !header.is_empty() {
                    *title = header;
                }
                continue;
            }
            body.push_str(line);
            body.push('\n');
        }
        body
    }
}

impl ExtractionStrategy for WuxiaworldStrategy {
    fn site(&self) -> SourceSite {
        SourceSite::Wuxiaworld
    }

    fn homepage_url(&self, slug: &str) -> String {
        format!("{}/novel/{}", self.base_url, slug)
    }

    fn build_chapter_url(&self, slug: &str, chapter: u32) -> String {
        format!("{}/novel/{}/chapter-{}/", self.base_url, slug, chapter)
    }

    fn is_chapter_page(&self, doc: &Html, final_url: &str, expected_chapter: u32) -> bool {
        if !final_url.contains(&format!("chapter-{}", expected_chapter)) {
            return false;
        }
        if cascade::first_element(doc, HOMEPAGE_BLOCK_SELECTORS).is_some() {
            return false;
        }
        let page_text = cascade::element_text(doc.root_element());
        if text::homepage_marker_count(&page_text) >= 3 {
            return false;
        }
        match cascade::first_element(doc, CONTENT_SELECTORS) {
            Some(content) => text::word_count(&cascade::element_text(content)) > 100,
            None => false,
        }
    }

    fn extract_chapter(&self, doc: &Html, chapter: u32) -> Option<ChapterDraft> {
        let page_text = cascade::element_text(doc.root_element()).to_lowercase();
        if page_text.contains("summary")
            && page_text.contains("author(s)")
            && page_text.contains("genre(s)")
        {
            tracing::warn!("Page for chapter {} looks like a novel homepage", chapter);
            return None;
        }

        let default_title = format!("Chapter {}", chapter);
        let mut title = cascade::first_text(doc, TITLE_SELECTORS)
            .map(|t| TITLE_PREFIX_RE.replace(&t, "").trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_title.clone());

        let content_element = cascade::first_element(doc, CONTENT_SELECTORS)?;
        let raw = text::element_text_with_breaks(content_element);
        let folded = self.fold_markdown_headers(&raw, &mut title, &default_title);
        let content = text::clean_content_lines(&folded);

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

        metadata.title = cascade::first_text(doc, &[".post-title h1", "h1.entry-title", "h1"])
            .map(|t| t.split(" - ").next().unwrap_or(&t).trim().to_string());

        let page_text = cascade::element_text(doc.root_element());
        metadata.author = cascade::first_text(doc, &[".author-content a", ".author-content"])
            .or_else(|| {
                AUTHOR_LABEL_RE
                    .captures(&page_text)
                    .map(|caps| caps[1].trim().to_string())
            });

        metadata.description = cascade::first_attr(doc, &["meta[name='description']"], "content")
            .or_else(|| {
                cascade::first_text(doc, &[".summary__content", ".description-summary", ".summary"])
            });

        metadata.cover_url = cascade::first_attr(doc, COVER_SELECTORS, "src")
            .map(|src| super::absolutize(&self.base_url, &src));

        metadata.genres = cascade::first_text_list(doc, GENRE_SELECTORS).unwrap_or_default();

        if let Some(status_text) = cascade::first_text(doc, STATUS_SELECTORS) {
            metadata.status = super::status_from_text(&status_text);
        }

        if let Ok(selector) = Selector::parse("a[href*='chapter-']") {
            metadata.declared_chapters = doc.select(&selector).count() as u32;
        }

        if metadata.title.is_none() && metadata.declared_chapters == 0 {
            return None;
        }
        Some(metadata)
    }

    fn find_next_chapter_url(&self, doc: &Html, current_url: &str) -> Option<String> {
        let selector = Selector::parse("a[href]").ok()?;
        for anchor in doc.select(&selector) {
            let label = cascade::element_text(anchor).to_lowercase();
            let href = anchor.value().attr("href")?;
            if label.contains("next") && href.contains("chapter-") {
                return super::resolve_href(current_url, href);
            }
        }
        None
    }

    fn politeness_delay(&self) -> Duration {
        POLITENESS_DELAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter_doc() -> Html {
        let paragraphs = "<p>\"We leave at dawn,\" he said, and she thought about the road \
             ahead while the fire burned low.</p>\
             <p>The caravan walked out through the gate as the first light touched the \
             walls, and nobody looked back at the city they were leaving behind.</p>";
        Html::parse_document(&format!(
            "<html><body><h1 class=\"entry-title\">Chapter 12 - The Long Road</h1>\
             <div class=\"entry-content\">{}<div class=\"chapter-nav\">\
             <a href=\"/novel/foo/chapter-13/\">Next</a></div></div></body></html>",
            paragraphs
        ))
    }

    fn homepage_doc() -> Html {
        Html::parse_document(
            "<html><body><div class=\"post-title\"><h1>Sword of the Nine Heavens</h1></div>\
             <div class=\"summary_image\"><img src=\"/covers/sword.jpg\"></div>\
             <div class=\"summary__content\">Summary A young cultivator rises.</div>\
             <div class=\"author-content\"><a>Flying Dagger</a></div>\
             <div class=\"genres-content\"><a>Action</a><a>Xianxia</a></div>\
             <div class=\"post-status\"><div class=\"summary-content\">Completed</div></div>\
             <ul><li><a href=\"/novel/sword/chapter-1/\">Chapter 1</a></li>\
             <li><a href=\"/novel/sword/chapter-2/\">Chapter 2</a></li></ul>\
             <p>Author(s): Flying Dagger Genre(s): Action Status: Completed</p>\
             </body></html>",
        )
    }

    #[test]
    fn test_url_templates() {
        let strategy = WuxiaworldStrategy::default();
        assert_eq!(
            strategy.homepage_url("sword"),
            "https://wuxiaworld.site/novel/sword"
        );
        assert_eq!(
            strategy.build_chapter_url("sword", 7),
            "https://wuxiaworld.site/novel/sword/chapter-7/"
        );
    }

    #[test]
    fn test_extract_chapter() {
        let strategy = WuxiaworldStrategy::default();
        let draft = strategy.extract_chapter(&chapter_doc(), 12).unwrap();
        assert_eq!(draft.title, "The Long Road");
        assert!(draft.content.contains("We leave at dawn"));
        assert!(!draft.content.contains("Next"));
    }

    #[test]
    fn test_extract_chapter_rejects_homepage() {
        let strategy = WuxiaworldStrategy::default();
        assert!(strategy.extract_chapter(&homepage_doc(), 3).is_none());
    }

    #[test]
    fn test_markdown_header_promoted_to_title() {
        let body = "<p>### Chapter 5: Embers</p>".to_string()
            + &"<p>The watchfire smoke drifted over the pass while the scouts argued \
                about the road, and he said nothing until they finished.</p>"
                .repeat(3);
        let doc = Html::parse_document(&format!(
            "<html><body><div class=\"entry-content\">{}</div></body></html>",
            body
        ));
        let strategy = WuxiaworldStrategy::default();
        let draft = strategy.extract_chapter(&doc, 5).unwrap();
        assert_eq!(draft.title, "Chapter 5: Embers");
        assert!(!draft.content.contains("###"));
    }

    #[test]
    fn test_is_chapter_page_rejects_wrong_url() {
        let strategy = WuxiaworldStrategy::default();
        assert!(!strategy.is_chapter_page(
            &chapter_doc(),
            "https://wuxiaworld.site/novel/foo",
            12
        ));
    }

    #[test]
    fn test_is_chapter_page_rejects_homepage_markup() {
        let strategy = WuxiaworldStrategy::default();
        assert!(!strategy.is_chapter_page(
            &homepage_doc(),
            "https://wuxiaworld.site/novel/foo/chapter-12/",
            12
        ));
    }

    #[test]
    fn test_is_chapter_page_accepts_real_chapter() {
        let paragraphs = "<p>word </p>".repeat(120);
        let doc = Html::parse_document(&format!(
            "<html><body><div class=\"entry-content\">{}</div></body></html>",
            paragraphs
        ));
        let strategy = WuxiaworldStrategy::default();
        assert!(strategy.is_chapter_page(
            &doc,
            "https://wuxiaworld.site/novel/foo/chapter-12/",
            12
        ));
    }

    #[test]
    fn test_extract_metadata() {
        let strategy = WuxiaworldStrategy::default();
        let metadata = strategy.extract_metadata(&homepage_doc(), "sword").unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Sword of the Nine Heavens"));
        assert_eq!(metadata.author.as_deref(), Some("Flying Dagger"));
        assert_eq!(
            metadata.cover_url.as_deref(),
            Some("https://wuxiaworld.site/covers/sword.jpg")
        );
        assert_eq!(metadata.genres, vec!["Action", "Xianxia"]);
        assert_eq!(metadata.status, crate::extract::NovelStatus::Completed);
        assert_eq!(metadata.declared_chapters, 2);
    }

    #[test]
    fn test_extract_metadata_rejects_empty_page() {
        let strategy = WuxiaworldStrategy::default();
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(strategy.extract_metadata(&doc, "sword").is_none());
    }

    #[test]
    fn test_find_next_chapter_url() {
        let strategy = WuxiaworldStrategy::default();
        let url = strategy
            .find_next_chapter_url(&chapter_doc(), "https://wuxiaworld.site/novel/foo/chapter-12/")
            .unwrap();
        assert_eq!(url, "https://wuxiaworld.site/novel/foo/chapter-13/");
    }

    #[test]
    fn test_chapter_number_from_discovered_url() {
        let strategy = WuxiaworldStrategy::default();
        assert_eq!(
            strategy.chapter_number_from_url("https://wuxiaworld.site/novel/foo/chapter-13/"),
            Some(13)
        );
    }
}
