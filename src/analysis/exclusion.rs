use crate::analysis::url::{UrlMode, UrlNormalizer};

/// Characters marking tracking, parameterized or fragment URLs.
const PARAMETER_MARKERS: [char; 3] = ['?', '=', '#'];

/// User-supplied URLs to drop from the analysis.
///
/// Entries only ever exclude the page they denote, with or without a scheme.
/// A section index such as `/blogs/news` does not exclude the articles below
/// it.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    entries: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, S>(entries: I, mode: UrlMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalizer = UrlNormalizer::new(mode);
        let entries = entries
            .into_iter()
            .map(|entry| normalizer.normalize(entry.as_ref()))
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `url` must already be a normalized key.
    pub fn is_excluded(&self, url: &str) -> bool {
        if url.contains(PARAMETER_MARKERS) {
            return true;
        }
        self.entries.iter().any(|entry| denotes(entry, url))
    }
}

fn denotes(entry: &str, url: &str) -> bool {
    if url == entry {
        return true;
    }
    // Entries carrying a scheme only ever match exactly.
    if entry.starts_with("http") {
        return false;
    }
    if url.strip_prefix("https://") == Some(entry) || url.strip_prefix("http://") == Some(entry) {
        return true;
    }
    if entry.starts_with('/') {
        url.ends_with(entry)
    } else {
        url.strip_suffix(entry)
            .is_some_and(|head| head.ends_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> ExclusionList {
        ExclusionList::new(entries.iter().copied(), UrlMode::ProtocolAware)
    }

    #[test]
    fn test_parameter_urls_always_excluded() {
        let empty = list(&[]);
        assert!(empty.is_excluded("https://site.com/page?ref=1"));
        assert!(empty.is_excluded("https://site.com/page#section"));
        assert!(empty.is_excluded("https://site.com/a=b"));
        assert!(!empty.is_excluded("https://site.com/page"));
    }

    #[test]
    fn test_path_entry_excludes_only_that_page() {
        let exclusions = list(&["/blogs/news"]);
        assert!(exclusions.is_excluded("https://site.com/blogs/news"));
        assert!(!exclusions.is_excluded("https://site.com/blogs/news/article-1"));
    }

    #[test]
    fn test_exact_entry_with_trailing_slash() {
        let exclusions = list(&["  https://www.trysnow.com/blogs/news/  "]);
        assert!(exclusions.is_excluded("https://www.trysnow.com/blogs/news"));
        assert!(!exclusions.is_excluded("https://www.trysnow.com/blogs/news/teeth"));
        assert!(!exclusions.is_excluded("http://www.trysnow.com/blogs/news"));
    }

    #[test]
    fn test_schemeless_entry_matches_either_scheme() {
        let exclusions = list(&["site.com/about"]);
        assert!(exclusions.is_excluded("https://site.com/about"));
        assert!(exclusions.is_excluded("http://site.com/about"));
        assert!(!exclusions.is_excluded("https://site.com/about-us"));
    }

    #[test]
    fn test_bare_segment_needs_a_slash_boundary() {
        let exclusions = list(&["search"]);
        assert!(exclusions.is_excluded("https://site.com/search"));
        assert!(!exclusions.is_excluded("https://site.com/research"));
    }

    #[test]
    fn test_blank_entries_ignored() {
        let exclusions = list(&["", "   ", "/"]);
        assert!(exclusions.is_empty());
        assert!(!exclusions.is_excluded("https://site.com"));
    }

    #[test]
    fn test_agnostic_mode_normalizes_entries() {
        let exclusions =
            ExclusionList::new(["https://site.com/about/"], UrlMode::ProtocolAgnostic);
        assert!(exclusions.is_excluded("site.com/about"));
    }
}
