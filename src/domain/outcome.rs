// ==========================================
// Inventory Count Automation - per-item result
// ==========================================

use crate::domain::types::RunOutcome;
use serde::{Deserialize, Serialize};

/// Outcome of one work item (launch record or storage code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item: String,
    pub outcome: RunOutcome,
    /// Completed, but the terminal did not come back to its baseline screen in time
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ItemResult {
    pub fn new(item: impl Into<String>, outcome: RunOutcome) -> Self {
        Self {
            item: item.into(),
            outcome,
            degraded: false,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }
}
