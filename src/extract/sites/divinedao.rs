//! Extraction strategy for divinedaolibrary.com
//!
//! A single-novel translator site with stable, semantic markup. Chapter URLs
//! embed the slug twice, chapter bodies live in a dedicated
//! `div.chapter-formatting` container, and metadata sits under labeled `h3`
//! headings.

use crate::extract::{
    cascade, text, ChapterDraft, ExtractionStrategy, NovelMetadata, SourceSite,
};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const BASE_URL: &str = "https://www.divinedaolibrary.com";
const POLITENESS_DELAY: Duration = Duration::from_secs(1);

const TITLE_SELECTORS: &[&str] = &["h1.chapter__title", "h1.entry-title", "h1"];

const CONTENT_SELECTORS: &[&str] = &["div.chapter-formatting", ".entry-content"];

const NEXT_LINK_SELECTORS: &[&str] = &[
    "a.button._secondary._navigation._next",
    "a[rel='next']",
];

#[derive(Debug, Clone)]
pub struct DivineDaoStrategy {
    base_url: String,
}

impl Default for DivineDaoStrategy {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }
}

impl DivineDaoStrategy {
    /// Points the strategy at a different host, used by tests
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Finds the text following a labeled `h3` heading
    fn text_after_heading(doc: &Html, label: &str) -> Option<String> {
        let selector = Selector::parse("h3").ok()?;
        for heading in doc.select(&selector) {
            let heading_text = cascade::element_text(heading).to_lowercase();
            if !heading_text.contains(label) {
                continue;
            }
            for sibling in heading.next_siblings() {
                if let Some(element) = ElementRef::wrap(sibling) {
                    let sibling_text = cascade::element_text(element);
                    if !sibling_text.is_empty() {
                        return Some(sibling_text);
                    }
                }
            }
        }
        None
    }
}

impl ExtractionStrategy for DivineDaoStrategy {
    fn site(&self) -> SourceSite {
        SourceSite::DivineDao
    }

    fn homepage_url(&self, slug: &str) -> String {
        format!("{}/story/{}", self.base_url, slug)
    }

    fn build_chapter_url(&self, slug: &str, chapter: u32) -> String {
        format!("{}/story/{}/{}-chapter-{}", self.base_url, slug, slug, chapter)
    }

    fn is_chapter_page(&self, doc: &Html, final_url: &str, expected_chapter: u32) -> bool {
        final_url.contains(&format!("chapter-{}", expected_chapter))
            && cascade::first_element(doc, CONTENT_SELECTORS).is_some()
    }

    fn extract_chapter(&self, doc: &Html, chapter: u32) -> Option<ChapterDraft> {
        let title = cascade::first_text(doc, TITLE_SELECTORS)
            .unwrap_or_else(|| format!("Chapter {}", chapter));

        let content_element = cascade::first_element(doc, CONTENT_SELECTORS)?;
        let raw = text::element_text_with_breaks(content_element);
        let content = text::clean_content_lines(&raw);

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

        metadata.title = cascade::first_text(doc, &["h1.story__identity-title", "h1"]);

        // The author sits inside the heading itself ("Author: Name"), not in
        // a following sibling like the description does.
        metadata.author = Selector::parse("h3")
            .ok()
            .and_then(|selector| {
                doc.select(&selector)
                    .map(cascade::element_text)
                    .find(|t| t.to_lowercase().starts_with("author"))
            })
            .and_then(|t| t.split_once(':').map(|(_, name)| name.trim().to_string()))
            .filter(|t| !t.is_empty());

        metadata.description = Self::text_after_heading(doc, "description");

        metadata.cover_url = cascade::first_attr(doc, &["img[alt*='Cover of']"], "src")
            .map(|src| super::absolutize(&self.base_url, &src));

        if let Some(status_text) =
            cascade::first_text(doc, &[".story__status", "span.status", ".status"])
        {
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
        let anchor = cascade::first_element(doc, NEXT_LINK_SELECTORS)?;
        let href = anchor.value().attr("href")?;
        super::resolve_href(current_url, href)
    }

    fn politeness_delay(&self) -> Duration {
        POLITENESS_DELAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter_doc() -> Html {
        Html::parse_document(
            "<html><body><h1 class=\"chapter__title\">Chapter 3 - The Sealed Gate</h1>\
             <div class=\"chapter-formatting\">\
             <p>\"The gate has been sealed for three hundred years,\" the elder said. \
             Li Wei thought of the stories his grandmother told and looked up at the \
             stone arch, its carvings worn smooth by wind and rain.</p>\
             <p>He walked forward alone, one palm pressed flat against the cold stone, \
             and the mountain answered with a sound like a bell rung underwater.</p>\
             </div>\
             <a class=\"button _secondary _navigation _next\" \
             href=\"/story/sealed-gate/sealed-gate-chapter-4\">Next</a>\
             </body></html>",
        )
    }

    fn homepage_doc() -> Html {
        Html::parse_document(
            "<html><body><h1 class=\"story__identity-title\">The Sealed Gate</h1>\
             <img alt=\"Cover of The Sealed Gate\" src=\"/images/gate.jpg\">\
             <h3>Author: Mountain Hermit</h3>\
             <h3>Description</h3>\
             <p>A young mason discovers the gate his family has guarded for \
             generations was built to keep something in.</p>\
             <span class=\"status\">Ongoing</span>\
             <ul><li><a href=\"/story/sealed-gate/sealed-gate-chapter-1\">Chapter 1</a></li>\
             <li><a href=\"/story/sealed-gate/sealed-gate-chapter-2\">Chapter 2</a></li>\
             <li><a href=\"/story/sealed-gate/sealed-gate-chapter-3\">Chapter 3</a></li></ul>\
             </body></html>",
        )
    }

    #[test]
    fn test_url_templates() {
        let strategy = DivineDaoStrategy::default();
        assert_eq!(
            strategy.homepage_url("sealed-gate"),
            "https://www.divinedaolibrary.com/story/sealed-gate"
        );
        assert_eq!(
            strategy.build_chapter_url("sealed-gate", 4),
            "https://www.divinedaolibrary.com/story/sealed-gate/sealed-gate-chapter-4"
        );
    }

    #[test]
    fn test_extract_chapter() {
        let strategy = DivineDaoStrategy::default();
        let draft = strategy.extract_chapter(&chapter_doc(), 3).unwrap();
        assert_eq!(draft.title, "Chapter 3 - The Sealed Gate");
        assert!(draft.content.contains("sealed for three hundred years"));
        assert!(!draft.content.contains("Next"));
    }

    #[test]
    fn test_extract_chapter_requires_content_container() {
        let doc = Html::parse_document("<html><body><p>bare page</p></body></html>");
        let strategy = DivineDaoStrategy::default();
        assert!(strategy.extract_chapter(&doc, 3).is_none());
    }

    #[test]
    fn test_extract_metadata() {
        let strategy = DivineDaoStrategy::default();
        let metadata = strategy
            .extract_metadata(&homepage_doc(), "sealed-gate")
            .unwrap();
        assert_eq!(metadata.title.as_deref(), Some("The Sealed Gate"));
        assert_eq!(metadata.author.as_deref(), Some("Mountain Hermit"));
        assert!(metadata
            .description
            .as_deref()
            .unwrap()
            .contains("guarded for generations"));
        assert_eq!(
            metadata.cover_url.as_deref(),
            Some("https://www.divinedaolibrary.com/images/gate.jpg")
        );
        assert_eq!(metadata.status, crate::extract::NovelStatus::Ongoing);
        assert_eq!(metadata.declared_chapters, 3);
    }

    #[test]
    fn test_find_next_chapter_url() {
        let strategy = DivineDaoStrategy::default();
        let url = strategy
            .find_next_chapter_url(
                &chapter_doc(),
                "https://www.divinedaolibrary.com/story/sealed-gate/sealed-gate-chapter-3",
            )
            .unwrap();
        assert_eq!(
            url,
            "https://www.divinedaolibrary.com/story/sealed-gate/sealed-gate-chapter-4"
        );
    }

    #[test]
    fn test_is_chapter_page() {
        let strategy = DivineDaoStrategy::default();
        assert!(strategy.is_chapter_page(
            &chapter_doc(),
            "https://www.divinedaolibrary.com/story/sealed-gate/sealed-gate-chapter-3",
            3
        ));
        assert!(!strategy.is_chapter_page(
            &chapter_doc(),
            "https://www.divinedaolibrary.com/story/sealed-gate",
            3
        ));
    }
}
