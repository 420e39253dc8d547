// ==========================================
// Inventory Count Automation - run summary
// ==========================================
// Every processed item with its outcome, in processing order, plus the
// counted records the plan builder rejected. Logged line by line at the
// end of a run; optionally written as JSON.
// ==========================================

use crate::batch::error::{RunError, RunResult};
use crate::domain::{ItemResult, RunOutcome};
use crate::engine::RejectedRecord;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub ok: usize,
    pub error: usize,
    pub skipped: usize,
    pub transfer_active: usize,
    pub degraded: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// "launch" or "storages"
    pub kind: String,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub items: Vec<ItemResult>,
    pub counts: OutcomeCounts,
    #[serde(default)]
    pub rejected: Vec<RejectedRecord>,
}

impl RunSummary {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            kind: kind.into(),
            started_at: Local::now(),
            finished_at: None,
            items: Vec::new(),
            counts: OutcomeCounts::default(),
            rejected: Vec::new(),
        }
    }

    pub fn record(&mut self, result: ItemResult) {
        match result.outcome {
            RunOutcome::Ok => self.counts.ok += 1,
            RunOutcome::Error => self.counts.error += 1,
            RunOutcome::Skipped => self.counts.skipped += 1,
            RunOutcome::TransferActive => self.counts.transfer_active += 1,
        }
        if result.degraded {
            self.counts.degraded += 1;
        }
        self.items.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn has_errors(&self) -> bool {
        self.counts.error > 0
    }

    pub fn outcome_of(&self, item: &str) -> Option<RunOutcome> {
        self.items.iter().find(|r| r.item == item).map(|r| r.outcome)
    }

    /// One line per item, then the rejections, then the totals.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.items.len() + self.rejected.len() + 1);
        for result in &self.items {
            let mut line = format!("{} -> {}", result.item, result.outcome);
            if result.degraded {
                line.push_str(" (degraded)");
            }
            if let Some(detail) = &result.detail {
                line.push_str(&format!(" [{}]", detail));
            }
            lines.push(line);
        }
        for rejected in &self.rejected {
            lines.push(format!(
                "row {} material {} -> REJECTED [{}]",
                rejected.row_number, rejected.material, rejected.reason
            ));
        }
        lines.push(format!(
            "total {}: ok={} error={} skipped={} transfer_active={} degraded={} rejected={}",
            self.items.len(),
            self.counts.ok,
            self.counts.error,
            self.counts.skipped,
            self.counts.transfer_active,
            self.counts.degraded,
            self.rejected.len()
        ));
        lines
    }

    pub fn log(&self) {
        info!(run_id = %self.run_id, kind = %self.kind, "===== run summary =====");
        for result in &self.items {
            let detail = result.detail.as_deref().unwrap_or("");
            match result.outcome {
                RunOutcome::Error => {
                    error!(item = %result.item, outcome = %result.outcome, detail, "item")
                }
                RunOutcome::Ok if !result.degraded => {
                    info!(item = %result.item, outcome = %result.outcome, detail, "item")
                }
                _ => warn!(
                    item = %result.item,
                    outcome = %result.outcome,
                    degraded = result.degraded,
                    detail,
                    "item"
                ),
            }
        }
        for rejected in &self.rejected {
            warn!(
                row = rejected.row_number,
                material = %rejected.material,
                reason = %rejected.reason,
                "rejected before launch"
            );
        }
        if let Some(total) = self.lines().last() {
            info!("{}", total);
        }
    }

    pub fn to_json(&self) -> RunResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RunError::SummaryWrite(e.to_string()))
    }

    pub fn write_json(&self, path: &Path) -> RunResult<()> {
        let text = self.to_json()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RunError::SummaryWrite(e.to_string()))?;
            }
        }
        std::fs::write(path, text).map_err(|e| RunError::SummaryWrite(e.to_string()))?;
        info!(path = %path.display(), "summary written");
        Ok(())
    }
}
