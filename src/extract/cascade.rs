//! Ordered-fallback selector evaluation
//!
//! Site layouts drift between themes and redesigns, so lookups are expressed
//! as ordered selector lists tried until one yields a usable value. A
//! selector that fails to parse is skipped rather than aborting the cascade.

use scraper::{ElementRef, Html, Selector};

/// Returns the first element matched by any selector in the list
pub fn first_element<'a>(doc: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            if let Some(element) = doc.select(&selector).next() {
                return Some(element);
            }
        }
    }
    None
}

/// Returns the first non-empty text produced by any selector in the list
pub fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            for element in doc.select(&selector) {
                let text = element_text(element);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Returns the first non-empty attribute value produced by any selector
pub fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            for element in doc.select(&selector) {
                if let Some(value) = element.value().attr(attr) {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Returns the texts of every element matched by the first selector that
/// matches anything at all
///
/// Used for genre and tag lists, where a selector either hits the whole list
/// or nothing.
pub fn first_text_list(doc: &Html, selectors: &[&str]) -> Option<Vec<String>> {
    for raw in selectors {
        if let Ok(selector) = Selector::parse(raw) {
            let texts: Vec<String> = doc
                .select(&selector)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect();
            if !texts.is_empty() {
                return Some(texts);
            }
        }
    }
    None
}

/// Concatenated descendant text with whitespace collapsed
pub fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_first_text_prefers_earlier_selector() {
        let doc = doc("<h1 class=\"entry-title\">Primary</h1><h1>Secondary</h1>");
        assert_eq!(
            first_text(&doc, &["h1.entry-title", "h1"]),
            Some("Primary".to_string())
        );
    }

    #[test]
    fn test_first_text_falls_through_empty_elements() {
        let doc = doc("<h1 class=\"entry-title\">  </h1><h2>Fallback</h2>");
        assert_eq!(
            first_text(&doc, &["h1.entry-title", "h2"]),
            Some("Fallback".to_string())
        );
    }

    #[test]
    fn test_first_text_none_when_nothing_matches() {
        let doc = doc("<p>just prose</p>");
        assert_eq!(first_text(&doc, &["h1", ".title"]), None);
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let doc = doc("<h1>Title</h1>");
        assert_eq!(
            first_text(&doc, &["h1[[[", "h1"]),
            Some("Title".to_string())
        );
    }

    #[test]
    fn test_first_attr() {
        let doc = doc("<img class=\"cover\" src=\"/covers/a.jpg\">");
        assert_eq!(
            first_attr(&doc, &["img.missing", "img.cover"], "src"),
            Some("/covers/a.jpg".to_string())
        );
    }

    #[test]
    fn test_first_text_list_takes_whole_first_match() {
        let doc = doc(
            "<div class=\"genres\"><a>Action</a><a>Fantasy</a></div>\
             <div class=\"tags\"><a>Other</a></div>",
        );
        assert_eq!(
            first_text_list(&doc, &[".genres a", ".tags a"]),
            Some(vec!["Action".to_string(), "Fantasy".to_string()])
        );
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let doc = doc("<p>spread\n   out\t text</p>");
        let element = first_element(&doc, &["p"]).unwrap();
        assert_eq!(element_text(element), "spread out text");
    }
}
