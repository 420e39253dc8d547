// ==========================================
// Inventory Count Automation - automation errors
// ==========================================
// Scope: every variant aborts the current record / storage item only.
// The batch runner catches them, records ERROR and moves on.
// ==========================================

use crate::terminal::TerminalError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("navigation timeout: {0}")]
    NavigationTimeout(String),

    #[error("action timed out: {0}")]
    ActionTimeout(String),

    #[error("terminal error: {0}")]
    Terminal(TerminalError),

    #[error("automation error: {0}")]
    Generic(String),
}

pub type AutomationResult<T> = Result<T, AutomationError>;

impl AutomationError {
    /// Short code used in log lines and screenshot names.
    pub fn code(&self) -> &'static str {
        match self {
            AutomationError::ElementNotFound(_) => "ELEMENT",
            AutomationError::NavigationTimeout(_) => "NAV_TIMEOUT",
            AutomationError::ActionTimeout(_) => "TIMEOUT",
            AutomationError::Terminal(_) => "TERMINAL",
            AutomationError::Generic(_) => "AUTO_ERR",
        }
    }

    /// Operator hint printed next to the error.
    pub fn hint(&self) -> &'static str {
        match self {
            AutomationError::ElementNotFound(_) => {
                "check that the expected screen is open and the control label did not change"
            }
            AutomationError::NavigationTimeout(_) => {
                "check the document number and the warehouse field, then rerun the item"
            }
            AutomationError::ActionTimeout(_) => "the terminal is slow; raise the timeout settings",
            AutomationError::Terminal(_) => "check the terminal session and the network connection",
            AutomationError::Generic(_) => "see the screenshot and the log lines around this item",
        }
    }
}

impl From<TerminalError> for AutomationError {
    fn from(err: TerminalError) -> Self {
        match err {
            TerminalError::ControlNotFound(control) => AutomationError::ElementNotFound(control),
            TerminalError::Timeout(what) => AutomationError::ActionTimeout(what),
            other => AutomationError::Terminal(other),
        }
    }
}
