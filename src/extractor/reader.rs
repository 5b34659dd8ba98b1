use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractor::cleaner::{collapse_whitespace, is_block, is_boilerplate};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:title']").unwrap());
static NAMED_META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[name]").unwrap());
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:description']").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static H2: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static MAIN_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("main, article, [role='main']").unwrap());

/// Subheadings kept per page.
pub const MAX_SUBHEADINGS: usize = 5;

pub fn title(document: &Html) -> String {
    document
        .select(&TITLE)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
        .or_else(|| meta_content(document, &OG_TITLE))
        .unwrap_or_default()
}

pub fn meta_description(document: &Html) -> String {
    document
        .select(&NAMED_META)
        .filter(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|c| !c.is_empty())
        .or_else(|| meta_content(document, &OG_DESCRIPTION))
        .unwrap_or_default()
}

pub fn headings(document: &Html, selector: &Selector, limit: usize) -> String {
    document
        .select(selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn h1(document: &Html) -> String {
    headings(document, &H1, usize::MAX)
}

pub fn h2(document: &Html) -> String {
    headings(document, &H2, MAX_SUBHEADINGS)
}

/// Visible copy of the page with navigation, scripts and page chrome removed.
/// Prefers the main content region and falls back to `<body>`.
pub fn body_text(document: &Html) -> String {
    let root = document
        .select(&MAIN_CONTENT)
        .next()
        .or_else(|| document.select(&BODY).next())
        .unwrap_or_else(|| document.root_element());
    let mut raw = String::new();
    collect_text(root, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if is_boilerplate(child_el.value()) {
                continue;
            }
            let block = is_block(child_el.value());
            if block {
                out.push(' ');
            }
            collect_text(child_el, out);
            if block {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|c| !c.is_empty())
}
