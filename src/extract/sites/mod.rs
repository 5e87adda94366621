//! Per-site strategy implementations

mod divinedao;
mod novelbin;
mod wuxiaworld;

pub use divinedao::DivineDaoStrategy;
pub use novelbin::NovelBinStrategy;
pub use wuxiaworld::WuxiaworldStrategy;

use crate::extract::NovelStatus;
use url::Url;

/// Resolves an href against the page it was found on
pub(crate) fn resolve_href(current_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = Url::parse(current_url).ok()?;
    Some(base.join(href).ok()?.to_string())
}

/// Makes an image URL absolute against a site base
pub(crate) fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// Maps a scraped status label onto the stored status vocabulary
pub(crate) fn status_from_text(text: &str) -> NovelStatus {
    let lower = text.to_lowercase();
    if lower.contains("completed") || lower.contains("finished") {
        NovelStatus::Completed
    } else if lower.contains("hiatus") || lower.contains("paused") {
        NovelStatus::Hiatus
    } else {
        NovelStatus::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_href() {
        assert_eq!(
            resolve_href("https://example.com/novel/foo/chapter-1", "/novel/foo/chapter-2"),
            Some("https://example.com/novel/foo/chapter-2".to_string())
        );
        assert_eq!(
            resolve_href("https://example.com/a", "https://other.com/b"),
            Some("https://other.com/b".to_string())
        );
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("https://example.com", "//cdn.example.com/c.jpg"),
            "https://cdn.example.com/c.jpg"
        );
        assert_eq!(
            absolutize("https://example.com/", "/covers/c.jpg"),
            "https://example.com/covers/c.jpg"
        );
        assert_eq!(
            absolutize("https://example.com", "https://x.com/c.jpg"),
            "https://x.com/c.jpg"
        );
    }

    #[test]
    fn test_status_from_text() {
        assert_eq!(status_from_text("Completed"), NovelStatus::Completed);
        assert_eq!(status_from_text("on hiatus"), NovelStatus::Hiatus);
        assert_eq!(status_from_text("OnGoing"), NovelStatus::Ongoing);
        assert_eq!(status_from_text(""), NovelStatus::Ongoing);
    }
}
