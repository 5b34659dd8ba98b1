pub mod cleaner;
pub mod reader;

#[cfg(test)]
mod tests;

use scraper::Html;

use crate::content::PageContent;

/// Body copy kept per page; presence checks only need the leading text.
pub const MAX_BODY_CHARS: usize = 5000;

/// Pulls the on-page SEO fields out of an HTML document.
///
/// Never fails: anything missing comes back as an empty field.
pub fn extract_page(url: &str, html: &str) -> PageContent {
    let document = Html::parse_document(html);

    PageContent {
        url: url.to_string(),
        title: reader::title(&document),
        meta_description: reader::meta_description(&document),
        h1: reader::h1(&document),
        h2: reader::h2(&document),
        body: cleaner::truncate_chars(reader::body_text(&document), MAX_BODY_CHARS),
    }
}
