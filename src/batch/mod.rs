// ==========================================
// Inventory Count Automation - batch layer
// ==========================================
// Responsibility: load inputs, iterate items, summarize the run
// ==========================================

pub mod error;
pub mod pipeline;
pub mod runner;
pub mod summary;

pub use error::{RunError, RunResult};
pub use pipeline::{plan_from_feed, plan_from_files, storage_codes_from_file};
pub use runner::BatchRunner;
pub use summary::{OutcomeCounts, RunSummary};
