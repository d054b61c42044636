//! Report Errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while emitting or loading tabular results
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("input file not found: {}", path.display())]
    MissingInputFile { path: PathBuf },

    #[error("unsupported input format for {}: expected .csv or .json", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("invalid value '{value}' for '{column}' on row {row}")]
    InvalidField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("no records in {0}")]
    EmptyData(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
