use std::io::Write;

use crate::analysis::StrikingDistanceRow;

/// Export column order; downstream spreadsheets depend on it.
pub const REPORT_COLUMNS: [&str; 9] = [
    "url", "query", "clicks", "position", "in_title", "in_meta", "in_h1", "in_h2", "in_body",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Writes the header even when there are no rows.
pub fn write_csv<W: Write>(rows: &[StrikingDistanceRow], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(REPORT_COLUMNS)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(rows: &[StrikingDistanceRow], writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, rows)
}

pub fn write_report<W: Write>(
    rows: &[StrikingDistanceRow],
    format: ExportFormat,
    writer: W,
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => write_csv(rows, writer)?,
        ExportFormat::Json => write_json(rows, writer)?,
    }
    Ok(())
}
