pub mod crawl_export;
pub mod model;
pub mod source;

pub use crawl_export::{ContentError, load_crawl_export};
pub use model::{ContentLookup, ContentMap, ContentStatus, PageContent};
pub use source::{ContentSource, HttpContentSource, collect_content, fetch_target};
