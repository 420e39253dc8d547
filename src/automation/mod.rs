// ==========================================
// Inventory Count Automation - automation layer
// ==========================================
// Responsibility: drive the terminal for launch records and storage
// codes. Owns the terminal screen for the duration of one item and
// always hands it back in a recognized state.
// ==========================================

pub mod entry_driver;
pub mod error;
pub mod screenshots;
pub mod session;
pub mod storage_workflow;
pub mod waits;

pub use entry_driver::{EntryDriver, EntryReport, EntryState};
pub use error::{AutomationError, AutomationResult};
pub use screenshots::Screenshots;
pub use session::warm_up;
pub use storage_workflow::{Detection, StorageOutcome, StorageWorkflow, WorkflowState};
pub use waits::{poll_until_any, poll_until_visible};
