// ==========================================
// Inventory Count Automation - run-scoped errors
// ==========================================
// Any of these stops the whole run before (or instead of) processing
// items. Item-scoped failures never surface here.
// ==========================================

use crate::automation::AutomationError;
use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("input rejected: {0}")]
    Import(#[from] ImportError),

    #[error("no input to process: {0}")]
    NoInput(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("terminal session unavailable: {0}")]
    Session(#[from] AutomationError),

    #[error("summary could not be written: {0}")]
    SummaryWrite(String),
}

pub type RunResult<T> = Result<T, RunError>;

impl RunError {
    /// True for missing or malformed input columns.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            RunError::Import(ImportError::SchemaError { .. })
                | RunError::Import(ImportError::MissingHeader { .. })
        )
    }
}
