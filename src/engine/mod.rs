// ==========================================
// Inventory Count Automation - engine layer
// ==========================================
// Responsibility: pure business rules (no terminal, no files)
// - UD reconciliation
// - launch plan building
// - bounded retry policy and injectable clock
// ==========================================

pub mod error;
pub mod launch_plan;
pub mod reconciliation;
pub mod retry;

pub use error::{ReconciliationError, ReconciliationResult};
pub use launch_plan::{mark_last_in_document, LaunchPlan, LaunchPlanBuilder, RejectedRecord};
pub use reconciliation::{check_sum_invariant, ReconciledUd, ReconciliationEngine};
pub use retry::{Clock, Deadline, ManualClock, RetryPolicy, SystemClock};
