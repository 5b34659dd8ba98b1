//! Content from an offline crawler export (Screaming Frog style "Internal
//! HTML" sheets) instead of live fetching.

use thiserror::Error;
use tracing::{info, instrument};

use crate::analysis::url::UrlNormalizer;
use crate::content::{ContentMap, PageContent};
use crate::ingest::{RawTable, find_column};

const ADDRESS: &[&str] = &["address", "url", "landing page", "page"];
const TITLE: &[&str] = &["title 1", "title"];
const META: &[&str] = &["meta description 1", "meta description"];
const H1: &[&str] = &["h1-1", "h1 1", "h1"];
const H2_NUMBERED: [&[&str]; 5] = [
    &["h2-1", "h2 1"],
    &["h2-2", "h2 2"],
    &["h2-3", "h2 3"],
    &["h2-4", "h2 4"],
    &["h2-5", "h2 5"],
];
const H2: &[&str] = &["h2"];
const BODY: &[&str] = &["copy", "body", "body text", "content"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("crawl export has no address column (available columns: {})", .available.join(", "))]
    MissingAddressColumn { available: Vec<String> },
}

/// Builds a content map keyed by normalized address. Rows without an address
/// are skipped; when an address repeats, the first row wins.
#[instrument(skip_all, fields(rows = table.rows.len()))]
pub fn load_crawl_export(
    table: &RawTable,
    normalizer: &UrlNormalizer,
) -> Result<ContentMap, ContentError> {
    let headers = &table.headers;
    let address = find_column(headers, ADDRESS).ok_or_else(|| ContentError::MissingAddressColumn {
        available: headers.clone(),
    })?;
    let title = find_column(headers, TITLE);
    let meta = find_column(headers, META);
    let h1 = find_column(headers, H1);
    let body = find_column(headers, BODY);
    let numbered_h2: Vec<usize> = H2_NUMBERED
        .iter()
        .filter_map(|aliases| find_column(headers, aliases))
        .collect();
    let h2_columns = if numbered_h2.is_empty() {
        find_column(headers, H2).into_iter().collect()
    } else {
        numbered_h2
    };

    let cell = |row: usize, column: Option<usize>| -> String {
        column
            .map(|c| table.cell(row, c).trim().to_string())
            .unwrap_or_default()
    };

    let mut content = ContentMap::new();
    for row in 0..table.rows.len() {
        let key = normalizer.normalize(table.cell(row, address));
        if key.is_empty() {
            continue;
        }
        let h2 = h2_columns
            .iter()
            .map(|&c| table.cell(row, c).trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let page = PageContent {
            url: key.clone(),
            title: cell(row, title),
            meta_description: cell(row, meta),
            h1: cell(row, h1),
            h2,
            body: cell(row, body),
        };
        content.insert(key, page);
    }

    info!("Loaded content for {} URLs from crawl export", content.len());
    Ok(content)
}
