use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error(
        "missing required columns: {} (available columns: {})",
        .missing.join(", "),
        .available.join(", ")
    )]
    MissingColumns {
        missing: Vec<&'static str>,
        available: Vec<String>,
    },
}
