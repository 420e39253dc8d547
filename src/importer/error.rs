// ==========================================
// Inventory Count Automation - importer errors
// ==========================================
// Tooling: thiserror derive
// Scope: every variant is run-scoped; a failed import aborts the run
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .csv/.xlsx/.xls/.xlsb/.ods)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("spreadsheet parse failed: {0}")]
    SpreadsheetParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== Schema errors =====
    #[error("schema error in {source_name}: mandatory column '{field}' is absent")]
    SchemaError { source_name: String, field: String },

    #[error("{source_name} has no header row")]
    MissingHeader { source_name: String },

    // ===== Data-source feed errors =====
    #[error("data-source query failed: {0}")]
    FeedQueryError(String),
}

pub type ImportResult<T> = Result<T, ImportError>;

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::SpreadsheetParseError(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::FeedQueryError(err.to_string())
    }
}
