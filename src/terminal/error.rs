// ==========================================
// Inventory Count Automation - terminal adapter errors
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerminalError {
    #[error("control not found: {0}")]
    ControlNotFound(String),

    #[error("timed out waiting for: {0}")]
    Timeout(String),

    #[error("terminal session error: {0}")]
    Session(String),

    #[error("screenshot failed: {0}")]
    Screenshot(String),
}

pub type TerminalResult<T> = Result<T, TerminalError>;
