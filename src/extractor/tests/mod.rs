use std::fs;

use crate::extractor::{MAX_BODY_CHARS, extract_page};

#[test]
fn test_extract_product_page() {
    let html = fs::read_to_string("src/extractor/tests/fixtures/product.html")
        .expect("Failed to read test fixture");

    let page = extract_page("https://shop.example.com/blue-shoes", &html);

    assert_eq!(page.url, "https://shop.example.com/blue-shoes");
    assert_eq!(page.title, "Buy Blue Shoes Online | Shoe Store");
    assert_eq!(
        page.meta_description,
        "Shop our range of blue running shoes with free delivery."
    );
    assert_eq!(page.h1, "Blue Running Shoes");
    assert_eq!(page.h2, "Why choose a blue shoe? Sizing");
    assert!(page.body.contains("built for long distances"));
    assert!(page.body.contains("Sizes run true to fit."));
    // Page chrome stays out of the body copy.
    assert!(!page.body.contains("Red Shoes"));
    assert!(!page.body.contains("Red shoes you may also like"));
    assert!(!page.body.contains("Newsletter"));
    assert!(!page.body.contains("Copyright"));
    assert!(!page.body.contains("tracking"));
    assert!(!page.body.contains("font-family"));
}

#[test]
fn test_empty_document_yields_empty_fields() {
    let page = extract_page("https://example.com/empty", "");
    assert_eq!(page.title, "");
    assert_eq!(page.meta_description, "");
    assert_eq!(page.h1, "");
    assert_eq!(page.h2, "");
    assert_eq!(page.body, "");
}

#[test]
fn test_multiple_h1_are_joined() {
    let page = extract_page(
        "https://example.com",
        "<html><body><h1>First</h1><h1> </h1><h1>Second</h1></body></html>",
    );
    assert_eq!(page.h1, "First Second");
}

#[test]
fn test_body_is_truncated() {
    let html = format!(
        "<html><body><p>{}</p></body></html>",
        "word ".repeat(MAX_BODY_CHARS)
    );
    let page = extract_page("https://example.com/long", &html);
    assert_eq!(page.body.chars().count(), MAX_BODY_CHARS);
}

#[test]
fn test_malformed_html() {
    let page = extract_page(
        "https://example.com/broken",
        "<html><head><title>Broken</title><body><h1>Unclosed<div>More content",
    );
    assert_eq!(page.title, "Broken");
    assert!(page.body.contains("More content"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let page = extract_page("https://example.com", &html);
            prop_assert!(page.body.chars().count() <= MAX_BODY_CHARS);
        }
    }
}
