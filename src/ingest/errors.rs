use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("input has no header row")]
    Empty,

    #[error("unsupported file format: {0} (export the sheet as CSV or TSV)")]
    UnsupportedFormat(String),

    #[error("input is not valid UTF-8")]
    Encoding,
}
