use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, instrument};

use crate::ingest::{RawTable, errors::IngestError};

const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "xlsm"];

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_table(path: impl AsRef<Path>) -> Result<RawTable, IngestError> {
    let path = path.as_ref();
    if let Some(ext) = path.extension().and_then(|e| e.to_str())
        && SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    {
        return Err(IngestError::UnsupportedFormat(ext.to_string()));
    }

    let bytes = fs::read(path)?;
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        return Err(IngestError::Encoding);
    }
    let table = parse_table(&text)?;
    debug!(
        "loaded {} rows with columns {:?}",
        table.rows.len(),
        table.headers
    );
    Ok(table)
}

/// Parses delimited text, guessing the delimiter from the header line.
pub fn parse_table(text: &str) -> Result<RawTable, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let first_line = text.lines().next().unwrap_or("");
    if first_line.trim().is_empty() {
        return Err(IngestError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(first_line))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Semicolon when the header has semicolons but no commas, tab when it has a
/// tab, comma otherwise.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') && !header_line.contains(',') {
        b';'
    } else if header_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}
