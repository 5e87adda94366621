//! Prose extraction and cleanup
//!
//! Turns a content subtree into readable chapter text: a DOM walk that skips
//! non-prose elements, line-level boilerplate stripping, and the quality
//! gates that reject navigation shells and homepages masquerading as
//! chapters.

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;
use std::sync::LazyLock;

/// Elements whose subtrees never contain chapter prose
const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "button", "form", "iframe", "noscript",
];

/// Class fragments marking navigation and ad containers
const SKIP_CLASS_MARKERS: &[&str] = &[
    "nav",
    "prev-next",
    "chapter-nav",
    "ads",
    "advertisement",
    "sharedaddy",
    "comments",
];

/// Elements that end a text run with a line break
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "section", "article",
    "blockquote",
];

/// Line-level boilerplate: any line containing one of these (case folded)
/// is dropped
const BOILERPLATE_LINE_MARKERS: &[&str] = &[
    "table of contents",
    "next chapter",
    "previous chapter",
    "click here",
    "read more",
    "subscribe",
    "donate",
    "report chapter",
    "remove ads",
];

/// Field labels that dominate novel homepages but never chapter prose
const HOMEPAGE_MARKERS: &[&str] = &[
    "summary",
    "author(s)",
    "genre(s)",
    "alternative",
    "rating",
    "status",
];

/// Tokens typical of narrative prose
const NARRATIVE_MARKERS: &[&str] = &[
    "\"", "\u{201c}", "\u{201d}", "he said", "she said", "thought", "looked", "walked",
];

/// Minimum word count for real chapter content
const MIN_CONTENT_WORDS: usize = 20;

/// Below this word count, content with no narrative markers is rejected
const NARRATIVE_FALLBACK_WORDS: usize = 200;

/// Bracketed navigation captions, e.g. `[Next]` or `[ previous ]`
static NAV_CAPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\[\s*(next|previous|prev)\b").unwrap());

/// Extracts the text of a subtree, preserving paragraph structure
///
/// `<br>` and block-element boundaries become newlines; script, style,
/// navigation, and ad subtrees are skipped entirely.
pub fn element_text_with_breaks(element: ElementRef) -> String {
    let mut out = String::new();
    walk(*element, &mut out);
    out
}

fn walk(node: NodeRef<Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if SKIP_ELEMENTS.contains(&name) {
                    continue;
                }
                if let Some(class) = el.attr("class") {
                    let class = class.to_lowercase();
                    if SKIP_CLASS_MARKERS.iter().any(|m| class.contains(m)) {
                        continue;
                    }
                }
                walk(child, out);
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Normalizes raw extracted text into clean chapter content
///
/// Per line: collapse internal whitespace, drop navigation captions and
/// boilerplate lines. Blank-line runs collapse to a single paragraph break.
pub fn clean_content_lines(raw: &str) -> String {
    let mut cleaned: Vec<String> = Vec::new();

    let mut previous_blank = true;
    for line in raw.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !previous_blank {
                cleaned.push(String::new());
                previous_blank = true;
            }
            continue;
        }
        if NAV_CAPTION_RE.is_match(&collapsed) {
            continue;
        }
        let lower = collapsed.to_lowercase();
        if BOILERPLATE_LINE_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }
        cleaned.push(collapsed);
        previous_blank = false;
    }

    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Counts distinct homepage field labels present in the text
pub fn homepage_marker_count(text: &str) -> usize {
    let lower = text.to_lowercase();
    HOMEPAGE_MARKERS
        .iter()
        .filter(|m| lower.contains(*m))
        .count()
}

/// Whether the text reads like narrative prose
pub fn looks_like_narrative(text: &str) -> bool {
    let lower = text.to_lowercase();
    NARRATIVE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Final acceptance check for extracted chapter content
///
/// Rejects content that is too short, that carries three or more homepage
/// field labels, or that is short and carries no narrative markers.
pub fn passes_quality_gate(content: &str) -> bool {
    let words = word_count(content);
    if words <= MIN_CONTENT_WORDS {
        return false;
    }
    if homepage_marker_count(content) >= 3 {
        return false;
    }
    if !looks_like_narrative(content) && words < NARRATIVE_FALLBACK_WORDS {
        return false;
    }
    true
}
