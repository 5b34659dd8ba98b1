use scraper::node::Element;

/// Subtrees never counted as body copy.
const EXCLUDED_TAGS: [&str; 8] = [
    "nav", "footer", "aside", "header", "script", "style", "noscript", "template",
];

/// Class or id tokens marking navigation, ads and other page chrome.
const BOILERPLATE_TOKENS: [&str; 16] = [
    "nav",
    "navigation",
    "menu",
    "sidebar",
    "footer",
    "header",
    "advertisement",
    "ad",
    "social",
    "share",
    "comment",
    "related-posts",
    "widget",
    "popup",
    "modal",
    "overlay",
];

/// Elements after which a word break is implied.
const BLOCK_TAGS: [&str; 17] = [
    "p", "div", "section", "article", "main", "li", "ul", "ol", "br", "h1", "h2", "h3", "h4",
    "h5", "h6", "td", "tr",
];

pub fn is_boilerplate(element: &Element) -> bool {
    if EXCLUDED_TAGS.contains(&element.name()) {
        return true;
    }
    if element
        .id()
        .is_some_and(|id| BOILERPLATE_TOKENS.contains(&id.to_lowercase().as_str()))
    {
        return true;
    }
    element
        .classes()
        .any(|class| BOILERPLATE_TOKENS.contains(&class.to_lowercase().as_str()))
}

pub fn is_block(element: &Element) -> bool {
    BLOCK_TAGS.contains(&element.name())
}

/// Collapses every whitespace run into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first_element(html: &str, selector: &str) -> Element {
        let document = Html::parse_fragment(html);
        let selector = Selector::parse(selector).unwrap();
        document.select(&selector).next().unwrap().value().clone()
    }

    #[test]
    fn test_boilerplate_by_tag_class_and_id() {
        assert!(is_boilerplate(&first_element("<nav>x</nav>", "nav")));
        assert!(is_boilerplate(&first_element(
            r#"<div class="Sidebar widget-area">x</div>"#,
            "div"
        )));
        assert!(is_boilerplate(&first_element(r#"<div id="footer">x</div>"#, "div")));
        assert!(!is_boilerplate(&first_element(
            r#"<div class="product-details">x</div>"#,
            "div"
        )));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Hello    world  \n\n\n  Test  "),
            "Hello world Test"
        );
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo".to_string(), 2), "hé");
        assert_eq!(truncate_chars("short".to_string(), 50), "short");
    }
}
